use std::sync::Arc;

use crate::collection::DocumentCollection;
use crate::common::{COLLECTION_ACCOUNTS, COLLECTION_BOOKMARKS, COLLECTION_LISTINGS};
use crate::config::DatabaseConfig;
use crate::errors::StoreResult;
use crate::store::mongo::MongoBackend;
use crate::store::sqlite::SqliteBackend;
use crate::store::StoreBackend;

/// The database facade.
///
/// A `Database` wraps whichever backend the builder selected; all
/// collection operations go through the same [DocumentCollection] surface
/// regardless of the backend, so code written against it never branches on
/// the storage engine in use.
///
/// ```ignore
/// let db = Database::builder()
///     .mongodb_url("mongodb://localhost:27017")
///     .open()?;
/// let listings = db.listings()?;
/// ```
///
/// Handles are cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn StoreBackend>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl Database {
    /// Creates a builder seeded with the default configuration.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder {
            config: DatabaseConfig::default(),
        }
    }

    /// Opens a database with an explicit configuration.
    pub fn open(config: DatabaseConfig) -> StoreResult<Self> {
        DatabaseBuilder { config }.open()
    }

    /// Opens a handle to the named collection.
    pub fn collection(&self, name: &str) -> StoreResult<DocumentCollection> {
        self.backend.collection(name)
    }

    /// The user-account collection.
    pub fn accounts(&self) -> StoreResult<DocumentCollection> {
        self.collection(COLLECTION_ACCOUNTS)
    }

    /// The marketplace-listing collection.
    pub fn listings(&self) -> StoreResult<DocumentCollection> {
        self.collection(COLLECTION_LISTINGS)
    }

    /// The saved-listing collection.
    pub fn bookmarks(&self) -> StoreResult<DocumentCollection> {
        self.collection(COLLECTION_BOOKMARKS)
    }

    /// The identifier of the backend in use, `"mongodb"` or `"sqlite"`.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Releases the backend's resources.
    pub fn close(&self) -> StoreResult<()> {
        log::info!("closing {} backend", self.backend.name());
        self.backend.close()
    }
}

/// Fluent builder for [Database].
///
/// [DatabaseBuilder::open] probes the primary MongoDB server first and
/// silently degrades to the SQLite emulation when the probe fails; use
/// [Database::backend_name] to observe which engine was selected.
pub struct DatabaseBuilder {
    config: DatabaseConfig,
}

impl DatabaseBuilder {
    pub fn config(mut self, config: DatabaseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn mongodb_url(mut self, url: &str) -> Self {
        self.config.mongodb_url = url.to_string();
        self
    }

    pub fn database_name(mut self, name: &str) -> Self {
        self.config.database_name = name.to_string();
        self
    }

    pub fn sqlite_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config.sqlite_path = path.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Probes the primary backend and opens whichever engine answers.
    ///
    /// # Errors
    ///
    /// Fails only when the fallback itself cannot be prepared, for example
    /// when the SQLite path is not writable. An unreachable primary is not
    /// an error.
    pub fn open(self) -> StoreResult<Database> {
        match MongoBackend::connect(
            &self.config.mongodb_url,
            &self.config.database_name,
            self.config.connect_timeout,
        ) {
            Ok(backend) => {
                log::info!(
                    "connected to mongodb database '{}'",
                    self.config.database_name
                );
                Ok(Database {
                    backend: Arc::new(backend),
                })
            }
            Err(error) => {
                log::warn!(
                    "mongodb unreachable at {}, falling back to sqlite at {}: {}",
                    self.config.mongodb_url,
                    self.config.sqlite_path.display(),
                    error
                );
                let backend = SqliteBackend::new(self.config.sqlite_path);
                backend.initialize()?;
                Ok(Database {
                    backend: Arc::new(backend),
                })
            }
        }
    }
}
