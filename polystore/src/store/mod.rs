//! Storage backends.
//!
//! A [StoreBackend] owns the physical storage for a database and hands out
//! [DocumentCollection] handles. Two implementations exist: the native
//! MongoDB backend ([mongo::MongoBackend]) and the SQLite emulation
//! ([sqlite::SqliteBackend]). Both present identical collection semantics;
//! callers never branch on which one they hold.

pub mod mongo;
pub mod sqlite;

use crate::collection::DocumentCollection;
use crate::errors::StoreResult;

/// The contract between the database facade and a physical storage engine.
pub trait StoreBackend: Send + Sync {
    /// A short identifier for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Opens a handle to the named collection.
    ///
    /// # Errors
    ///
    /// [crate::errors::ErrorKind::CollectionNotFound] when the backend does
    /// not serve the named collection. The emulation backend only serves
    /// the declared collection set; the native backend serves any name.
    fn collection(&self, name: &str) -> StoreResult<DocumentCollection>;

    /// Releases backend resources. Further use of the backend or any
    /// collection handle obtained from it is an error.
    fn close(&self) -> StoreResult<()>;
}
