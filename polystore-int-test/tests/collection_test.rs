use polystore::filter::{all, by_id, Query};
use polystore::{doc, ErrorKind, Update, Value};
use polystore_int_test::test_util::{
    cleanup, create_test_context, create_test_listings, run_test,
};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_insert_and_find_by_id() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            let id = listings.insert_one(doc! { title: "Tomato seeds", price: 50 })?;
            assert!(!id.is_empty());

            let found = listings.find_one(&by_id(&id))?;
            assert!(found.is_some());
            let found = found.unwrap();
            assert_eq!(found.get("title"), Some(&Value::from("Tomato seeds")));
            assert_eq!(found.get("price"), Some(&Value::I64(50)));

            assert!(listings.find_one(&by_id("nonexistent"))?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_with_same_id_overwrites() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { "_id": "p1", price: 50 })?;
            listings.insert_one(doc! { "_id": "p1", price: 75 })?;

            assert_eq!(listings.count_documents(&all())?, 1);
            let found = listings.find_one(&by_id("p1"))?.unwrap();
            assert_eq!(found.get("price"), Some(&Value::I64(75)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_set_and_inc() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { "_id": "p1", status: "active", views: 10 })?;

            let modified = listings.update_one(
                &by_id("p1"),
                &Update::new().set("status", "sold").inc("views", 5),
            )?;
            assert_eq!(modified, 1);

            let found = listings.find_one(&by_id("p1"))?.unwrap();
            assert_eq!(found.get("status"), Some(&Value::from("sold")));
            assert_eq!(found.get("views"), Some(&Value::I64(15)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_push_appends_and_creates() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { "_id": "p1", tags: ["organic"] })?;

            listings.update_one(&by_id("p1"), &Update::new().push("tags", "local"))?;
            // pushing to a missing field creates a fresh array
            listings.update_one(&by_id("p1"), &Update::new().push("images", "a.jpg"))?;

            let found = listings.find_one(&by_id("p1"))?.unwrap();
            assert_eq!(
                found.get("tags"),
                Some(&Value::Array(vec!["organic".into(), "local".into()]))
            );
            assert_eq!(
                found.get("images"),
                Some(&Value::Array(vec!["a.jpg".into()]))
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_missing_document_modifies_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { "_id": "p1", price: 50 })?;

            let modified =
                listings.update_one(&by_id("missing"), &Update::new().set("price", 999))?;
            assert_eq!(modified, 0);
            let found = listings.find_one(&by_id("p1"))?.unwrap();
            assert_eq!(found.get("price"), Some(&Value::I64(50)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_one() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            for doc in create_test_listings() {
                listings.insert_one(doc)?;
            }

            assert_eq!(listings.delete_one(&by_id("p2"))?, 1);
            assert_eq!(listings.delete_one(&by_id("p2"))?, 0);
            assert_eq!(listings.count_documents(&all())?, 2);
            assert!(listings.find_one(&by_id("p2"))?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_count_with_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            for doc in create_test_listings() {
                listings.insert_one(doc)?;
            }

            assert_eq!(listings.count_documents(&all())?, 3);
            assert_eq!(
                listings.count_documents(&Query::new().eq("category", "seeds"))?,
                2
            );
            assert_eq!(
                listings.count_documents(
                    &Query::new().eq("category", "seeds").gte("price", 100)
                )?,
                1
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_regex_search() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            for doc in create_test_listings() {
                listings.insert_one(doc)?;
            }

            let hits = listings
                .find(Query::new().regex_ignore_case("title", "SEEDS"))
                .to_vec()?;
            assert_eq!(hits.len(), 2);

            let exact = listings
                .find(Query::new().regex("title", "SEEDS"))
                .to_vec()?;
            assert!(exact.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_or_query() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            for doc in create_test_listings() {
                listings.insert_one(doc)?;
            }

            let hits = listings
                .find(polystore::filter::or(vec![
                    Query::new().eq("region", "andijan"),
                    Query::new().gte("price", 300),
                ]))
                .to_vec()?;
            assert_eq!(hits.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_or_with_overlapping_branches_matches_once() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            // satisfies both branches of the OR
            listings.insert_one(doc! { "_id": "p1", region: "andijan", price: 500 })?;

            let query = polystore::filter::or(vec![
                Query::new().eq("region", "andijan"),
                Query::new().gte("price", 100),
            ]);
            let hits = listings.find(query.clone()).to_vec()?;
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].id(), Some("p1"));
            assert_eq!(listings.count_documents(&query)?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_membership_query() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            for doc in create_test_listings() {
                listings.insert_one(doc)?;
            }

            let hits = listings
                .find(Query::new().one_of("region", ["fergana", "namangan"]))
                .to_vec()?;
            assert_eq!(hits.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_all_declared_collections_are_served() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.accounts()?.insert_one(doc! { username: "aziz" })?;
            db.listings()?.insert_one(doc! { title: "x" })?;
            db.bookmarks()?.insert_one(doc! { listing_id: "p1" })?;

            assert_eq!(db.accounts()?.count_documents(&all())?, 1);
            assert_eq!(db.listings()?.count_documents(&all())?, 1);
            assert_eq!(db.bookmarks()?.count_documents(&all())?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_pattern_reports_filter_error() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { title: "x" })?;

            let err = listings
                .find(Query::new().regex("title", "(unclosed"))
                .to_vec()
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FilterError);
            Ok(())
        },
        cleanup,
    )
}
