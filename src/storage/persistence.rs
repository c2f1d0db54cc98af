//! TableRepository trait: pluggable table storage backend
//!
//! Abstracts named-table persistence so the pipeline does not care where
//! tables live:
//! - `TableStore`: sled-backed durable store
//! - `InMemoryStore`: in-process store for tests and dry runs

use std::collections::BTreeMap;

use chrono::Utc;

use super::StorageError;
use crate::types::RecordTable;

/// Named flat-table storage
///
/// Implementations must be thread-safe (Send + Sync).
pub trait TableRepository: Send + Sync {
    /// Store `table` under its name, replacing any existing table of that name
    fn save_table(&self, table: &RecordTable) -> Result<(), StorageError>;

    /// Load a table by name; `StorageError::NotFound` if absent
    fn load_table(&self, name: &str) -> Result<RecordTable, StorageError>;

    fn has_table(&self, name: &str) -> Result<bool, StorageError>;

    /// Stored table names, sorted
    fn table_names(&self) -> Result<Vec<String>, StorageError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// In-memory table storage
///
/// Thread-safe via `RwLock`. Not durable: data is lost on drop.
#[derive(Default)]
pub struct InMemoryStore {
    tables: std::sync::RwLock<BTreeMap<String, RecordTable>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableRepository for InMemoryStore {
    fn save_table(&self, table: &RecordTable) -> Result<(), StorageError> {
        let mut store = self
            .tables
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        let mut stored = table.clone();
        stored.saved_at = Some(Utc::now());
        store.insert(table.name.clone(), stored);
        Ok(())
    }

    fn load_table(&self, name: &str) -> Result<RecordTable, StorageError> {
        let store = self
            .tables
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        store
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn has_table(&self, name: &str) -> Result<bool, StorageError> {
        let store = self
            .tables
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(store.contains_key(name))
    }

    fn table_names(&self) -> Result<Vec<String>, StorageError> {
        let store = self
            .tables
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(store.keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}
