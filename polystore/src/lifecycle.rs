//! Process-wide database lifecycle.
//!
//! Services that want a single shared handle instead of threading a
//! [Database] through every call site use this module: [connect] once at
//! startup, [database] everywhere else, [shutdown] on the way out. The
//! state machine moves from unopened to open to closed and never back; a
//! process that has shut its database down must restart to get a new one.

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::config::DatabaseConfig;
use crate::database::Database;
use crate::errors::{ErrorKind, StoreError, StoreResult};

enum LifecycleState {
    Unopened,
    Open(Database),
    Closed,
}

static STATE: Lazy<RwLock<LifecycleState>> = Lazy::new(|| RwLock::new(LifecycleState::Unopened));

/// Opens the process-wide database from the environment configuration.
///
/// See [connect_with].
pub fn connect() -> StoreResult<Database> {
    connect_with(DatabaseConfig::from_env())
}

/// Opens the process-wide database with an explicit configuration.
///
/// The write lock is held through the backend probe, so concurrent callers
/// racing to connect serialize and all receive the same handle. Calling
/// this while already open returns the existing handle without probing
/// again.
///
/// # Errors
///
/// [ErrorKind::StoreAlreadyClosed] once [shutdown] has run; any error of
/// [crate::DatabaseBuilder::open] when the fallback cannot be prepared.
pub fn connect_with(config: DatabaseConfig) -> StoreResult<Database> {
    let mut state = STATE.write();
    match &*state {
        LifecycleState::Open(database) => Ok(database.clone()),
        LifecycleState::Closed => Err(StoreError::new(
            "the shared database was shut down and cannot be reopened",
            ErrorKind::StoreAlreadyClosed,
        )),
        LifecycleState::Unopened => {
            let database = Database::open(config)?;
            *state = LifecycleState::Open(database.clone());
            Ok(database)
        }
    }
}

/// Returns the process-wide database handle.
///
/// # Errors
///
/// [ErrorKind::StoreNotInitialized] before [connect] has run;
/// [ErrorKind::StoreAlreadyClosed] after [shutdown].
pub fn database() -> StoreResult<Database> {
    match &*STATE.read() {
        LifecycleState::Open(database) => Ok(database.clone()),
        LifecycleState::Unopened => Err(StoreError::new(
            "connect() must run before the shared database is used",
            ErrorKind::StoreNotInitialized,
        )),
        LifecycleState::Closed => Err(StoreError::new(
            "the shared database was shut down",
            ErrorKind::StoreAlreadyClosed,
        )),
    }
}

/// Closes the process-wide database and seals the lifecycle.
///
/// Idempotent once closed. Handles cloned out earlier become unusable; the
/// backend's resources are released here.
///
/// # Errors
///
/// [ErrorKind::InvalidOperation] when no database was ever opened.
pub fn shutdown() -> StoreResult<()> {
    let mut state = STATE.write();
    match &*state {
        LifecycleState::Open(database) => {
            database.close()?;
            *state = LifecycleState::Closed;
            Ok(())
        }
        LifecycleState::Closed => Ok(()),
        LifecycleState::Unopened => Err(StoreError::new(
            "shutdown() called before any database was opened",
            ErrorKind::InvalidOperation,
        )),
    }
}
