//! The emulation backend: document semantics on top of SQLite.
//!
//! Each declared collection is one table of `(id TEXT PRIMARY KEY,
//! data TEXT NOT NULL)` rows; the blob column holds the codec's encoded
//! form of the document. Filtering, sorting, and update application all
//! happen in process over a full scan; there is no query planner and no
//! index beyond the primary key.
//!
//! Every operation opens its own connection. This is a hard constraint,
//! not an optimization choice: the engine binds background resources to
//! the connection's creation context, and a connection cached across
//! operations is unusable after its first release. The cost is that no
//! operation is transactional with respect to another; see
//! [`crate::collection::CollectionProvider::update_one`].

use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::time::Duration;

use crate::collection::{codec, CollectionProvider, Document, DocumentCollection, FindOptions};
use crate::common::{SortOrder, Value, EMULATED_COLLECTIONS};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::filter::Query;
use crate::store::StoreBackend;
use crate::update::Update;

/// How long a fresh connection waits on a locked database file before
/// giving up. Concurrent callers each hold their own connection, so a
/// writer briefly locking the file is routine, not an error.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The SQLite-backed emulation of the document store.
pub struct SqliteBackend {
    db_path: PathBuf,
}

impl SqliteBackend {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        SqliteBackend {
            db_path: db_path.into(),
        }
    }

    /// Creates the table for every declared collection if absent.
    pub fn initialize(&self) -> StoreResult<()> {
        let conn = open_connection(&self.db_path)?;
        for name in EMULATED_COLLECTIONS {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, data TEXT NOT NULL)",
                name
            ))?;
        }
        log::debug!(
            "emulation schema ready for {} collections at {}",
            EMULATED_COLLECTIONS.len(),
            self.db_path.display()
        );
        Ok(())
    }
}

impl StoreBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn collection(&self, name: &str) -> StoreResult<DocumentCollection> {
        if !EMULATED_COLLECTIONS.contains(&name) {
            return Err(StoreError::new(
                &format!(
                    "collection '{}' is only available on the MongoDB backend",
                    name
                ),
                ErrorKind::CollectionNotFound,
            ));
        }
        Ok(DocumentCollection::new(SqliteCollection {
            table: name.to_string(),
            db_path: self.db_path.clone(),
        }))
    }

    fn close(&self) -> StoreResult<()> {
        // nothing is held open between operations
        Ok(())
    }
}

/// Opens a fresh connection for a single operation.
fn open_connection(db_path: &PathBuf) -> StoreResult<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

/// One collection on the emulation backend.
///
/// Holds only the table name and the database path, never a connection.
struct SqliteCollection {
    table: String,
    db_path: PathBuf,
}

impl SqliteCollection {
    fn connection(&self) -> StoreResult<Connection> {
        open_connection(&self.db_path)
    }

    /// Loads the full candidate set in insertion order.
    fn scan(&self, conn: &Connection) -> StoreResult<Vec<Document>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT data FROM {} ORDER BY rowid",
            self.table
        ))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut documents = Vec::new();
        for blob in rows {
            documents.push(codec::decode(&blob?)?);
        }
        Ok(documents)
    }

    /// Direct primary-key lookup, bypassing the scan.
    fn get_by_id(&self, conn: &Connection, id: &str) -> StoreResult<Option<Document>> {
        let blob: Option<String> = conn
            .query_row(
                &format!("SELECT data FROM {} WHERE id = ?1", self.table),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        match blob {
            Some(blob) => Ok(Some(codec::decode(&blob)?)),
            None => Ok(None),
        }
    }
}

impl CollectionProvider for SqliteCollection {
    fn name(&self) -> &str {
        &self.table
    }

    fn find_one(&self, query: &Query) -> StoreResult<Option<Document>> {
        let conn = self.connection()?;

        if let Some(id) = query.as_id_lookup() {
            return self.get_by_id(&conn, id);
        }

        for document in self.scan(&conn)? {
            if query.matches(&document)? {
                return Ok(Some(document));
            }
        }
        Ok(None)
    }

    fn insert_one(&self, mut document: Document) -> StoreResult<String> {
        let id = document.ensure_id();
        let blob = codec::encode(&document)?;

        let conn = self.connection()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (id, data) VALUES (?1, ?2)",
                self.table
            ),
            params![id, blob],
        )?;
        Ok(id)
    }

    fn update_one(&self, query: &Query, update: &Update) -> StoreResult<u64> {
        // read and rewrite are two independent round trips; see the trait
        // docs for the lost-update hazard this accepts
        let Some(document) = self.find_one(query)? else {
            return Ok(0);
        };
        let prior_id = document.id().unwrap_or_default().to_string();
        let updated = update.apply(&document)?;
        let id = updated.id().unwrap_or(&prior_id).to_string();
        let blob = codec::encode(&updated)?;

        let conn = self.connection()?;
        conn.execute(
            &format!("UPDATE {} SET id = ?1, data = ?2 WHERE id = ?3", self.table),
            params![id, blob, prior_id],
        )?;
        Ok(1)
    }

    fn delete_one(&self, query: &Query) -> StoreResult<u64> {
        let Some(document) = self.find_one(query)? else {
            return Ok(0);
        };
        let id = document.id().unwrap_or_default().to_string();

        let conn = self.connection()?;
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.table),
            params![id],
        )?;
        Ok(1)
    }

    fn count_documents(&self, query: &Query) -> StoreResult<u64> {
        let conn = self.connection()?;
        let mut count = 0;
        for document in self.scan(&conn)? {
            if query.matches(&document)? {
                count += 1;
            }
        }
        Ok(count)
    }

    fn find_with_options(
        &self,
        query: &Query,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let conn = self.connection()?;

        let mut matched = Vec::new();
        for document in self.scan(&conn)? {
            if query.matches(&document)? {
                matched.push(document);
            }
        }

        if let Some((field, order)) = &options.sort_by {
            matched.sort_by(|a, b| {
                let left = a.get(field).cloned().unwrap_or(Value::String(String::new()));
                let right = b.get(field).cloned().unwrap_or(Value::String(String::new()));
                let primary = match order {
                    SortOrder::Ascending => left.compare(&right),
                    SortOrder::Descending => right.compare(&left),
                };
                // identity tie-break keeps result order reproducible
                primary.then_with(|| a.id().unwrap_or_default().cmp(b.id().unwrap_or_default()))
            });
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.effective_limit() as usize;
        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }
}
