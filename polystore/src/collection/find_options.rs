use crate::common::{SortOrder, DEFAULT_FIND_LIMIT};

/// Sorting and pagination state for a find operation.
///
/// Built up by [`crate::collection::DocumentCursor`] configuration calls
/// and interpreted by each backend: sort by the configured field (a
/// missing field sorts as the empty string), then skip, then limit.
#[derive(Clone, Debug, Default)]
pub struct FindOptions {
    pub(crate) sort_by: Option<(String, SortOrder)>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
}

impl FindOptions {
    /// Creates options with no sorting and default pagination.
    pub fn new() -> Self {
        FindOptions::default()
    }

    /// Sorts results by a field in the given order.
    pub fn sort_by(mut self, field: &str, order: SortOrder) -> Self {
        self.sort_by = Some((field.to_string(), order));
        self
    }

    /// Skips the first `skip` results.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Caps the number of returned results.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The limit a backend must apply: the configured one, or the hard
    /// default cap when the caller left it unset.
    pub(crate) fn effective_limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_FIND_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FindOptions::new();
        assert!(options.sort_by.is_none());
        assert!(options.skip.is_none());
        assert_eq!(options.effective_limit(), DEFAULT_FIND_LIMIT);
    }

    #[test]
    fn test_chaining() {
        let options = FindOptions::new()
            .sort_by("price", SortOrder::Descending)
            .skip(10)
            .limit(5);
        assert_eq!(
            options.sort_by,
            Some(("price".to_string(), SortOrder::Descending))
        );
        assert_eq!(options.skip, Some(10));
        assert_eq!(options.effective_limit(), 5);
    }
}
