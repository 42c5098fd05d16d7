use std::ops::Deref;
use std::sync::Arc;

use crate::collection::{Document, DocumentCursor, FindOptions};
use crate::errors::StoreResult;
use crate::filter::Query;
use crate::update::Update;

/// Trait defining the per-collection operations a backend implements.
///
/// There are exactly two implementations: the native MongoDB collection and
/// the SQLite emulation. Callers never see which one they hold; backend
/// identity is decided once at startup by the selector and never branched
/// on past this seam.
pub trait CollectionProvider: Send + Sync {
    /// Returns the name of this collection.
    fn name(&self) -> &str;

    /// Finds the first document matching the query, if any.
    fn find_one(&self, query: &Query) -> StoreResult<Option<Document>>;

    /// Inserts a document, returning its identity.
    ///
    /// Insertion is upsert-by-identity: inserting with an existing identity
    /// silently replaces the prior document. This keeps retries idempotent
    /// and is not an error path. A document without an identity gets a
    /// generated one before it is written.
    fn insert_one(&self, document: Document) -> StoreResult<String>;

    /// Locates the first document matching the query, applies the update,
    /// and rewrites the whole document. Returns the number of documents
    /// modified (0 or 1); a miss is a zero count, never an error.
    ///
    /// On the emulation backend the read and the rewrite are two
    /// independent round trips: two callers racing on the same identity
    /// can both read the same prior state and the last writer silently
    /// discards the first's effect. Readers never observe a
    /// partially-applied update.
    fn update_one(&self, query: &Query, update: &Update) -> StoreResult<u64>;

    /// Removes the first document matching the query. Returns the number
    /// of documents deleted (0 or 1); a miss is a zero count, never an
    /// error.
    fn delete_one(&self, query: &Query) -> StoreResult<u64>;

    /// Counts documents matching the query across the full candidate set;
    /// never served from a persisted counter.
    fn count_documents(&self, query: &Query) -> StoreResult<u64>;

    /// Executes a find with sorting and pagination. Callers normally go
    /// through [DocumentCursor] instead of calling this directly.
    fn find_with_options(
        &self,
        query: &Query,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;
}

/// A handle to a named collection of documents.
///
/// `DocumentCollection` wraps whichever [CollectionProvider] the active
/// backend produced. Clones share the same provider.
#[derive(Clone)]
pub struct DocumentCollection {
    inner: Arc<dyn CollectionProvider>,
}

impl DocumentCollection {
    /// Creates a collection handle from a provider implementation.
    pub fn new<T: CollectionProvider + 'static>(inner: T) -> Self {
        DocumentCollection {
            inner: Arc::new(inner),
        }
    }

    /// Creates a cursor over the documents matching the query. The cursor
    /// is inert until one of its terminal calls executes it.
    pub fn find(&self, query: Query) -> DocumentCursor {
        DocumentCursor::new(self.inner.clone(), query)
    }
}

impl Deref for DocumentCollection {
    type Target = Arc<dyn CollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl std::fmt::Debug for DocumentCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCollection")
            .field("name", &self.inner.name())
            .finish()
    }
}
