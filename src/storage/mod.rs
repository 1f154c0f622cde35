//! Durable key-value record storage.
//!
//! All persistent state in this crate lives under three fixed keys in a
//! schemaless key→JSON-blob namespace. The `RecordStore` trait is the seam
//! between the repository and the platform: `SqliteStore` is the durable
//! implementation, `MemoryStore` a fault-injectable stand-in.
//!
//! There is no cross-key atomicity: a write to the task list and a write to
//! the settings record are independent operations.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Record key holding the JSON array of tasks.
pub const TASKS_KEY: &str = "tasks";
/// Record key holding the JSON settings object.
pub const SETTINGS_KEY: &str = "settings";
/// First-launch sentinel: absent means first launch, `"false"` once cleared.
pub const FIRST_LAUNCH_KEY: &str = "first_launch";

/// Schemaless durable key→blob storage.
pub trait RecordStore {
    /// Read the blob stored under `key`. An absent key is `Ok(None)`, never
    /// an error.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Atomically replace the blob stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove every listed key. Absent keys are not an error.
    fn remove_many(&mut self, keys: &[&str]) -> Result<(), StorageError>;
}

/// Returns `~/.config/taskpad[-dev]/` based on TASKPAD_ENV.
///
/// Set TASKPAD_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TASKPAD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("taskpad-dev")
    } else {
        base_dir.join("taskpad")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}
