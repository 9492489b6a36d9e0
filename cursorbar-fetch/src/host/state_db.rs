//! Read-only access to VS Code style `state.vscdb` files.
//!
//! Editors built on VS Code keep global state in a SQLite database with a
//! single key/value table:
//!
//! ```sql
//! CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);
//! ```
//!
//! The running editor holds the file open and may be writing to it, so we
//! never open it in place. [`StateDb::open`] copies the database (and its
//! WAL sidecar, if present) into a private temporary directory and queries
//! the copy. The copy is removed when the [`StateDb`] is dropped.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension};
use tempfile::TempDir;
use tracing::{debug, instrument};

use crate::error::StateDbError;

/// Name of the key/value table.
const ITEM_TABLE: &str = "ItemTable";

/// Name of the copied database inside the temp directory.
const COPY_NAME: &str = "state.vscdb";

// ============================================================================
// State Database
// ============================================================================

/// An open snapshot of a state database.
pub struct StateDb {
    // Declared before `_temp` so the connection closes before the directory
    // is removed.
    conn: Connection,
    _temp: TempDir,
    source: PathBuf,
}

impl StateDb {
    /// Snapshots and opens the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StateDbError::NotFound` if `path` is not a file,
    /// `StateDbError::Io` if the copy fails, and `StateDbError::Sqlite` if
    /// the copy cannot be opened as a database.
    #[instrument(fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self, StateDbError> {
        if !path.is_file() {
            return Err(StateDbError::NotFound(path.to_path_buf()));
        }

        let temp = tempfile::Builder::new().prefix("cursorbar-state").tempdir()?;
        let copy = temp.path().join(COPY_NAME);
        fs::copy(path, &copy)?;

        // Recent writes may still live in the write-ahead log.
        for suffix in ["-wal", "-shm"] {
            let sidecar = sidecar_path(path, suffix);
            if sidecar.is_file() {
                fs::copy(&sidecar, sidecar_path(&copy, suffix))?;
            }
        }

        let conn = Connection::open(&copy)?;
        debug!(copy = %copy.display(), "Opened state database snapshot");

        Ok(Self {
            conn,
            _temp: temp,
            source: path.to_path_buf(),
        })
    }

    /// Path of the original database file.
    pub fn source_path(&self) -> &Path {
        &self.source
    }

    /// Looks up a value in `ItemTable`.
    ///
    /// Text and blob values are both returned as UTF-8 (lossily decoded).
    /// A missing row or a NULL value is `None`.
    ///
    /// # Errors
    ///
    /// Returns `StateDbError::Sqlite` if the query fails, including when
    /// the table does not exist.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, StateDbError> {
        let sql = format!("SELECT value FROM {ITEM_TABLE} WHERE key = ?1");
        let value = self
            .conn
            .query_row(&sql, [key], |row| Ok(value_to_string(row.get_ref(0)?)))
            .optional()?;

        Ok(value.flatten())
    }

    /// Lists all table names.
    ///
    /// # Errors
    ///
    /// Returns `StateDbError::Sqlite` if the schema cannot be read.
    pub fn table_names(&self) -> Result<Vec<String>, StateDbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Returns up to `limit` keys matching any of the SQL `LIKE` patterns.
    ///
    /// # Errors
    ///
    /// Returns `StateDbError::Sqlite` if the query fails.
    pub fn keys_matching(
        &self,
        patterns: &[&str],
        limit: usize,
    ) -> Result<Vec<String>, StateDbError> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let clauses = (1..=patterns.len())
            .map(|i| format!("key LIKE ?{i}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "SELECT key FROM {ITEM_TABLE} WHERE {clauses} ORDER BY key LIMIT {limit}"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let keys = stmt
            .query_map(rusqlite::params_from_iter(patterns.iter()), |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Returns the first `limit` keys in table order.
    ///
    /// # Errors
    ///
    /// Returns `StateDbError::Sqlite` if the query fails.
    pub fn sample_keys(&self, limit: usize) -> Result<Vec<String>, StateDbError> {
        let sql = format!("SELECT key FROM {ITEM_TABLE} LIMIT {limit}");
        let mut stmt = self.conn.prepare(&sql)?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl std::fmt::Debug for StateDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDb")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

fn sidecar_path(db: &Path, suffix: &str) -> PathBuf {
    let mut name = db.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn value_to_string(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
