//! In-memory record store with failure injection.
//!
//! Used by tests to exercise storage-fault handling without a database, and
//! usable by embedders as a throwaway preview store.

use std::collections::HashMap;

use super::RecordStore;
use crate::error::StorageError;

/// HashMap-backed record store.
///
/// The `fail_reads` / `fail_writes` toggles make every subsequent read or
/// write return a storage fault; `fail_writes_after` lets that many more
/// writes succeed before the fault trips.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub fail_writes_after: Option<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_fault(&mut self) -> bool {
        if self.fail_writes || self.fail_writes_after == Some(0) {
            return true;
        }
        if let Some(remaining) = self.fail_writes_after.as_mut() {
            *remaining -= 1;
        }
        false
    }
}

impl RecordStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::ReadFailed {
                key: key.to_string(),
                message: "injected read failure".to_string(),
            });
        }
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.write_fault() {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: "injected write failure".to_string(),
            });
        }
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_many(&mut self, keys: &[&str]) -> Result<(), StorageError> {
        if self.write_fault() {
            return Err(StorageError::WriteFailed {
                key: keys.join(","),
                message: "injected write failure".to_string(),
            });
        }
        for key in keys {
            self.records.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behaves_like_a_record_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.read("tasks").unwrap(), None);
        store.write("tasks", "[]").unwrap();
        assert_eq!(store.read("tasks").unwrap().as_deref(), Some("[]"));
        store.remove_many(&["tasks"]).unwrap();
        assert_eq!(store.read("tasks").unwrap(), None);
    }

    #[test]
    fn injected_failures_surface_as_storage_errors() {
        let mut store = MemoryStore::new();
        store.write("tasks", "[]").unwrap();
        store.fail_reads = true;
        assert!(matches!(
            store.read("tasks"),
            Err(StorageError::ReadFailed { .. })
        ));
        store.fail_reads = false;
        store.fail_writes = true;
        assert!(matches!(
            store.write("tasks", "[1]"),
            Err(StorageError::WriteFailed { .. })
        ));
        // Failed write left the previous value intact.
        assert_eq!(store.read("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn write_fault_trips_after_the_budget_is_spent() {
        let mut store = MemoryStore::new();
        store.fail_writes_after = Some(1);
        store.write("tasks", "[]").unwrap();
        assert!(matches!(
            store.write("tasks", "[1]"),
            Err(StorageError::WriteFailed { .. })
        ));
        assert_eq!(store.read("tasks").unwrap().as_deref(), Some("[]"));
    }
}
