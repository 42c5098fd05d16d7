use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Connection settings for the database.
///
/// The defaults target a local development setup; [DatabaseConfig::from_env]
/// overrides them from the process environment for deployment.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// MongoDB connection string for the primary backend.
    pub mongodb_url: String,
    /// Logical database name on the primary backend.
    pub database_name: String,
    /// File path for the SQLite fallback.
    pub sqlite_path: PathBuf,
    /// How long to wait for the primary server before falling back.
    pub connect_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            mongodb_url: "mongodb://localhost:27017".to_string(),
            database_name: "marketplace".to_string(),
            sqlite_path: PathBuf::from("marketplace.db"),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl DatabaseConfig {
    /// Builds a configuration from the environment, falling back to the
    /// defaults for any variable that is unset.
    ///
    /// Recognized variables: `MONGODB_URL`, `DATABASE_NAME`, `SQLITE_PATH`.
    pub fn from_env() -> Self {
        let defaults = DatabaseConfig::default();
        DatabaseConfig {
            mongodb_url: env::var("MONGODB_URL").unwrap_or(defaults.mongodb_url),
            database_name: env::var("DATABASE_NAME").unwrap_or(defaults.database_name),
            sqlite_path: env::var("SQLITE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.sqlite_path),
            connect_timeout: defaults.connect_timeout,
        }
    }

    pub fn with_mongodb_url(mut self, url: &str) -> Self {
        self.mongodb_url = url.to_string();
        self
    }

    pub fn with_database_name(mut self, name: &str) -> Self {
        self.database_name = name.to_string();
        self
    }

    pub fn with_sqlite_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sqlite_path = path.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
