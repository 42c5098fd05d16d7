/// The identity field of a document, unique within its collection.
pub const DOC_ID: &str = "_id";

/// Temporal fields re-hydrated by name when decoding a stored blob.
///
/// This is a convention of the data model: no non-temporal field may use
/// one of these names.
pub const TEMPORAL_FIELDS: [&str; 2] = ["created_at", "updated_at"];

/// Maximum number of documents a cursor returns when no explicit limit is
/// configured. This is a hard cap, not a convenience; callers needing more
/// must pass an explicit limit.
pub const DEFAULT_FIND_LIMIT: u64 = 100;

/// The user-account collection.
pub const COLLECTION_ACCOUNTS: &str = "accounts";

/// The marketplace-listing collection.
pub const COLLECTION_LISTINGS: &str = "listings";

/// The saved-listing collection.
pub const COLLECTION_BOOKMARKS: &str = "bookmarks";

/// Collections that both backends must support identically. Collections
/// outside this set (conversations, chat sessions) exist only on the
/// native backend.
pub const EMULATED_COLLECTIONS: [&str; 3] = [
    COLLECTION_ACCOUNTS,
    COLLECTION_LISTINGS,
    COLLECTION_BOOKMARKS,
];
