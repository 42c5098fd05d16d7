use std::time::Duration;

use polystore::filter::{all, by_id, Query};
use polystore::{doc, Database, DatabaseConfig, ErrorKind, Value};
use polystore_int_test::test_util::{
    cleanup, create_test_context, random_path, run_test, PROBE_TIMEOUT, UNREACHABLE_MONGODB_URL,
};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_unreachable_primary_selects_fallback() {
    run_test(
        create_test_context,
        |ctx| {
            assert_eq!(ctx.db().backend_name(), "sqlite");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_database_debug_names_backend() {
    run_test(
        create_test_context,
        |ctx| {
            assert_eq!(
                format!("{:?}", ctx.db()),
                "Database { backend: \"sqlite\" }"
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_fallback_serves_only_declared_collections() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            assert!(db.accounts().is_ok());
            assert!(db.listings().is_ok());
            assert!(db.bookmarks().is_ok());

            let err = db.collection("conversations").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::CollectionNotFound);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filtered_count_scenario() {
    run_test(
        create_test_context,
        |ctx| {
            let listings = ctx.db().listings()?;
            listings.insert_one(doc! { "_id": "p1", price: 50, category: "seeds" })?;
            listings.insert_one(doc! { "_id": "p2", price: 150, category: "seeds" })?;

            let query = Query::new().eq("category", "seeds").gte("price", 100);
            assert_eq!(listings.count_documents(&query)?, 1);

            let hits = listings.find(query).to_vec()?;
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].id(), Some("p2"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_data_persists_across_reopen() {
    let path = random_path();
    let config = DatabaseConfig::default()
        .with_mongodb_url(UNREACHABLE_MONGODB_URL)
        .with_connect_timeout(PROBE_TIMEOUT)
        .with_sqlite_path(path.clone());

    let db = Database::open(config.clone()).unwrap();
    db.listings()
        .unwrap()
        .insert_one(doc! { "_id": "p1", title: "Tomato seeds" })
        .unwrap();
    db.close().unwrap();

    let reopened = Database::open(config).unwrap();
    let found = reopened
        .listings()
        .unwrap()
        .find_one(&by_id("p1"))
        .unwrap()
        .unwrap();
    assert_eq!(found.get("title"), Some(&Value::from("Tomato seeds")));
    reopened.close().unwrap();

    let _ = std::fs::remove_file(path);
}

#[test]
fn test_temporal_fields_round_trip_on_fallback() {
    run_test(
        create_test_context,
        |ctx| {
            let accounts = ctx.db().accounts()?;
            let now = chrono::Utc::now();
            accounts.insert_one(doc! {
                "_id": "u1",
                username: "aziz",
                created_at: now,
                updated_at: now,
            })?;

            let found = accounts.find_one(&by_id("u1"))?.unwrap();
            for field in ["created_at", "updated_at"] {
                let stored = found.get(field).and_then(Value::as_datetime);
                assert_eq!(
                    stored.map(|dt| dt.timestamp_micros()),
                    Some(now.timestamp_micros()),
                    "field {} did not survive the round trip",
                    field
                );
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_probe_timeout_is_bounded() {
    let path = random_path();
    let start = std::time::Instant::now();
    let db = Database::open(
        DatabaseConfig::default()
            .with_mongodb_url(UNREACHABLE_MONGODB_URL)
            .with_connect_timeout(Duration::from_millis(300))
            .with_sqlite_path(path.clone()),
    )
    .unwrap();
    // generous margin over the configured timeout
    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(db.backend_name(), "sqlite");

    db.close().unwrap();
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_fallback_document_count_independent_per_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.listings()?.insert_one(doc! { title: "a" })?;
            db.listings()?.insert_one(doc! { title: "b" })?;
            db.bookmarks()?.insert_one(doc! { listing_id: "p1" })?;

            assert_eq!(db.listings()?.count_documents(&all())?, 2);
            assert_eq!(db.bookmarks()?.count_documents(&all())?, 1);
            assert_eq!(db.accounts()?.count_documents(&all())?, 0);
            Ok(())
        },
        cleanup,
    )
}
