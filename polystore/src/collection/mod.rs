//! Documents, the blob codec, collection handles, and cursors.

pub mod codec;
mod document;
mod document_cursor;
mod find_options;
mod store_collection;

pub use document::Document;
pub use document_cursor::DocumentCursor;
pub use find_options::FindOptions;
pub use store_collection::{CollectionProvider, DocumentCollection};
