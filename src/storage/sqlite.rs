//! SQLite-backed record store.
//!
//! A single `records` table maps keys to JSON blobs. Writes are upserts, so
//! the replace-at-key contract is atomic per statement.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, RecordStore};
use crate::error::StorageError;

/// Durable key→blob store on SQLite.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store at `~/.config/taskpad/taskpad.db`, creating the table
    /// if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("taskpad.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn, path.to_path_buf())
    }

    /// Open an in-memory store (for tests and previews).
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::init(conn, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, path: PathBuf) -> Result<Self, StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(|source| StorageError::OpenFailed { path, source })?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO records (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| StorageError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn remove_many(&mut self, keys: &[&str]) -> Result<(), StorageError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StorageError::WriteFailed {
                key: keys.join(","),
                message: e.to_string(),
            })?;
        for key in keys {
            tx.execute("DELETE FROM records WHERE key = ?1", params![key])
                .map_err(|e| StorageError::WriteFailed {
                    key: (*key).to_string(),
                    message: e.to_string(),
                })?;
        }
        tx.commit().map_err(|e| StorageError::WriteFailed {
            key: keys.join(","),
            message: e.to_string(),
        })
    }
}
