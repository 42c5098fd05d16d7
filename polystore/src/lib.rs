//! # Polystore - Polymorphic Document Store
//!
//! Polystore is a document-collection layer that runs on top of either a
//! MongoDB server or a local SQLite file, behind one API. The primary
//! backend is probed at open time; when it is unreachable the store
//! silently degrades to the SQLite emulation, which reimplements document
//! filtering, sorting, and update application in process.
//!
//! ## Key Features
//!
//! - **One API, two engines**: Application code never branches on the
//!   backend in use
//! - **Query builder**: Equality, ranges, membership, pattern match, and
//!   logical OR, evaluated identically by both backends
//! - **Typed updates**: `$set`, `$inc`, and `$push` through a builder that
//!   makes unsupported modifiers inexpressible
//! - **Cursor chaining**: Sort, skip, and limit composed fluently with a
//!   hard default cap on result size
//! - **Graceful degradation**: Probe-and-fallback connection with an
//!   observable backend identity
//! - **Process lifecycle**: An optional shared handle with a strict
//!   unopened/open/closed state machine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use polystore::{doc, filter::Query, Database, SortOrder, Update};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::builder()
//!     .mongodb_url("mongodb://localhost:27017")
//!     .sqlite_path("marketplace.db")
//!     .open()?;
//!
//! let listings = db.listings()?;
//! listings.insert_one(doc! { title: "Tomato seeds", price: 50 })?;
//!
//! let cheap = listings
//!     .find(Query::new().lte("price", 100))
//!     .sort("price", SortOrder::Ascending)
//!     .to_vec()?;
//!
//! listings.update_one(
//!     &Query::id(&cheap[0].id().unwrap_or_default().to_string()),
//!     &Update::new().set("status", "sold"),
//! )?;
//!
//! db.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Documents, collections, cursors, and the blob codec
//! - [`common`] - Shared value model, ordering, and constants
//! - [`config`] - Connection configuration
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - The query builder and in-process matcher
//! - [`lifecycle`] - The optional process-wide shared handle
//! - [`store`] - The two storage backends

pub mod collection;
pub mod common;
pub mod config;
pub mod errors;
pub mod filter;
pub mod lifecycle;
pub mod store;

mod database;
mod update;

pub use crate::collection::{Document, DocumentCollection, DocumentCursor, FindOptions};
pub use crate::common::{SortOrder, Value};
pub use crate::config::DatabaseConfig;
pub use crate::database::{Database, DatabaseBuilder};
pub use crate::errors::{ErrorKind, StoreError, StoreResult};
pub use crate::update::Update;
