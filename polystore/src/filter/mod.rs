//! Query filters evaluated identically on both backends.

mod query;

pub use query::{all, by_id, or, Query};
pub(crate) use query::{Clause, FieldCondition, Operator};
