//! Common types shared across the crate: the [Value] variant type, sort
//! ordering, field/collection constants, and small lock helpers.

pub mod constants;
pub mod sort_order;
pub mod value;

pub use constants::*;
pub use sort_order::SortOrder;
pub use value::Value;

use parking_lot::RwLock;
use std::sync::Arc;

/// A shared, lock-protected value.
pub type Atomic<T> = Arc<RwLock<T>>;

/// Wraps a value in an [Atomic].
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}
