use std::sync::Arc;

use crate::collection::{CollectionProvider, Document, FindOptions};
use crate::common::SortOrder;
use crate::errors::StoreResult;
use crate::filter::Query;

/// A lazily-configured, eagerly-executed multi-document query.
///
/// A cursor is created by [`crate::collection::DocumentCollection::find`],
/// configured through any sequence of [DocumentCursor::sort],
/// [DocumentCursor::skip], and [DocumentCursor::limit] calls, and stays
/// inert until terminated by [DocumentCursor::to_vec] (or one of the other
/// terminal calls), which executes the query on the backing store.
///
/// When no limit is configured, execution applies a hard cap of 100
/// documents; callers needing more pass an explicit limit. Ties within the
/// same sort key are broken by identity ascending, so a given document set,
/// query, and configuration always reproduce the same sequence.
///
/// ```ignore
/// let page = listings
///     .find(Query::new().eq("category", "seeds"))
///     .sort("price", SortOrder::Ascending)
///     .skip(10)
///     .limit(5)
///     .to_vec()?;
/// ```
pub struct DocumentCursor {
    provider: Arc<dyn CollectionProvider>,
    query: Query,
    options: FindOptions,
}

impl DocumentCursor {
    pub(crate) fn new(provider: Arc<dyn CollectionProvider>, query: Query) -> Self {
        DocumentCursor {
            provider,
            query,
            options: FindOptions::new(),
        }
    }

    /// Sorts results by a field. A document missing the field sorts as if
    /// the value were the empty string.
    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.options = self.options.sort_by(field, order);
        self
    }

    /// Skips the first `count` results, after sorting.
    pub fn skip(mut self, count: u64) -> Self {
        self.options = self.options.skip(count);
        self
    }

    /// Caps the number of returned results, after sorting and skipping.
    pub fn limit(mut self, count: u64) -> Self {
        self.options = self.options.limit(count);
        self
    }

    /// Executes the query and returns the matching documents.
    pub fn to_vec(self) -> StoreResult<Vec<Document>> {
        self.provider.find_with_options(&self.query, &self.options)
    }

    /// Executes the query and returns the first matching document, if any.
    pub fn first(self) -> StoreResult<Option<Document>> {
        Ok(self.limit(1).to_vec()?.into_iter().next())
    }

    /// Executes the query and returns the number of returned documents
    /// (subject to skip and limit, unlike
    /// [`crate::collection::CollectionProvider::count_documents`]).
    pub fn count(self) -> StoreResult<usize> {
        Ok(self.to_vec()?.len())
    }
}
