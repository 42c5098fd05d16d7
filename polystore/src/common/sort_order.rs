/// Specifies the direction for sorting documents in a cursor.
///
/// Used with [`crate::collection::DocumentCursor::sort`] to control result
/// ordering. When no sort is configured, results follow insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest, A-Z, oldest to newest)
    #[default]
    Ascending,
    /// Sort in descending order (largest to smallest, Z-A, newest to oldest)
    Descending,
}
