use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};

use polystore::{doc, Database, DatabaseConfig, Document, StoreResult};

/// A connection string no server answers on, so the builder's probe fails
/// fast and every test exercises the fallback engine.
pub const UNREACHABLE_MONGODB_URL: &str = "mongodb://127.0.0.1:1";

/// How long the probe is allowed to take in tests.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Runs a test with guaranteed cleanup: `after` runs whether the test body
/// passes, fails, or panics.
pub fn run_test<B, T, A>(before: B, test: T, after: A)
where
    B: FnOnce() -> StoreResult<TestContext>,
    T: FnOnce(TestContext) -> StoreResult<()>,
    A: FnOnce(TestContext) -> StoreResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("test setup failed: {:?}", e),
    };

    let outcome = {
        let ctx = ctx.clone();
        std::panic::catch_unwind(AssertUnwindSafe(move || test(ctx)))
    };

    if let Err(e) = after(ctx) {
        eprintln!("Warning: test cleanup failed: {:?}", e);
    }

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("test failed: {:?}", e),
        Err(panic_payload) => std::panic::resume_unwind(panic_payload),
    }
}

#[derive(Clone)]
pub struct TestContext {
    path: PathBuf,
    db: Database,
}

impl TestContext {
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn db(&self) -> Database {
        self.db.clone()
    }
}

pub fn random_path() -> PathBuf {
    env::temp_dir().join(format!("polystore_test_{}.db", uuid::Uuid::new_v4()))
}

/// Opens a database against an unreachable primary so the fallback engine
/// is selected, backed by a unique temporary file.
pub fn create_test_context() -> StoreResult<TestContext> {
    let path = random_path();
    let db = Database::open(
        DatabaseConfig::default()
            .with_mongodb_url(UNREACHABLE_MONGODB_URL)
            .with_connect_timeout(PROBE_TIMEOUT)
            .with_sqlite_path(path.clone()),
    )?;
    assert_eq!(db.backend_name(), "sqlite");
    Ok(TestContext { path, db })
}

pub fn cleanup(ctx: TestContext) -> StoreResult<()> {
    if let Err(e) = ctx.db().close() {
        eprintln!("Warning: failed to close database: {:?}", e);
    }
    if ctx.path().exists() {
        fs::remove_file(ctx.path())?;
    }
    Ok(())
}

pub fn create_test_listings() -> Vec<Document> {
    vec![
        doc! {
            "_id": "p1",
            title: "Tomato seeds",
            price: 50,
            category: "seeds",
            region: "fergana",
        },
        doc! {
            "_id": "p2",
            title: "Cucumber seeds",
            price: 150,
            category: "seeds",
            region: "andijan",
        },
        doc! {
            "_id": "p3",
            title: "Steel shovel",
            price: 300,
            category: "tools",
            region: "fergana",
        },
    ]
}
