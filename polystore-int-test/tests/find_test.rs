use polystore::filter::{all, Query};
use polystore::{doc, SortOrder, Value};
use polystore_int_test::test_util::{cleanup, create_test_context, run_test};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_sort_skip_limit_pagination() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            for i in 0..25 {
                listings.insert_one(doc! {
                    "_id": (format!("p{:02}", i)),
                    price: (i as i64 * 10),
                })?;
            }

            let page = listings
                .find(all())
                .sort("price", SortOrder::Ascending)
                .skip(10)
                .limit(5)
                .to_vec()?;

            let prices: Vec<i64> = page
                .iter()
                .map(|d| d.get("price").and_then(Value::as_i64).unwrap())
                .collect();
            assert_eq!(prices, [100, 110, 120, 130, 140]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_descending_sort() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { "_id": "a", price: 10 })?;
            listings.insert_one(doc! { "_id": "b", price: 30 })?;
            listings.insert_one(doc! { "_id": "c", price: 20 })?;

            let hits = listings
                .find(all())
                .sort("price", SortOrder::Descending)
                .to_vec()?;
            let ids: Vec<&str> = hits.iter().map(|d| d.id().unwrap()).collect();
            assert_eq!(ids, ["b", "c", "a"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_ties_are_deterministic() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { "_id": "z", price: 5 })?;
            listings.insert_one(doc! { "_id": "a", price: 5 })?;
            listings.insert_one(doc! { "_id": "m", price: 5 })?;

            let first = listings
                .find(all())
                .sort("price", SortOrder::Ascending)
                .to_vec()?;
            let second = listings
                .find(all())
                .sort("price", SortOrder::Ascending)
                .to_vec()?;

            let ids: Vec<&str> = first.iter().map(|d| d.id().unwrap()).collect();
            assert_eq!(ids, ["a", "m", "z"]);
            assert_eq!(first, second);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_default_limit_caps_large_result_sets() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            for i in 0..120 {
                listings.insert_one(doc! { "_id": (format!("p{:03}", i)) })?;
            }

            // the cap applies when no limit is given
            assert_eq!(listings.find(all()).to_vec()?.len(), 100);
            // but an explicit limit lifts it
            assert_eq!(listings.find(all()).limit(500).to_vec()?.len(), 120);
            // the full count is unaffected by the cursor cap
            assert_eq!(listings.count_documents(&all())?, 120);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_first_returns_earliest_match() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { "_id": "p1", category: "seeds" })?;
            listings.insert_one(doc! { "_id": "p2", category: "seeds" })?;

            let first = listings
                .find(Query::new().eq("category", "seeds"))
                .first()?;
            assert_eq!(first.unwrap().id(), Some("p1"));

            let none = listings.find(Query::new().eq("category", "tools")).first()?;
            assert!(none.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cursor_count() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            for i in 0..7 {
                listings.insert_one(doc! { "_id": (format!("p{}", i)), price: (i as i64) })?;
            }

            let count = listings.find(Query::new().gte("price", 3)).count()?;
            assert_eq!(count, 4);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_range_query_with_pagination() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            for i in 0..20 {
                listings.insert_one(doc! {
                    "_id": (format!("p{:02}", i)),
                    price: (i as i64),
                })?;
            }

            let hits = listings
                .find(Query::new().gte("price", 5).lte("price", 14))
                .sort("price", SortOrder::Descending)
                .limit(3)
                .to_vec()?;
            let prices: Vec<i64> = hits
                .iter()
                .map(|d| d.get("price").and_then(Value::as_i64).unwrap())
                .collect();
            assert_eq!(prices, [14, 13, 12]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unfiltered_unsorted_find_keeps_insertion_order() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { "_id": "z" })?;
            listings.insert_one(doc! { "_id": "a" })?;
            listings.insert_one(doc! { "_id": "m" })?;

            let hits = listings.find(all()).to_vec()?;
            let ids: Vec<&str> = hits.iter().map(|d| d.id().unwrap()).collect();
            assert_eq!(ids, ["z", "a", "m"]);
            Ok(())
        },
        cleanup,
    )
}
