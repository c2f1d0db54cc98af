//! Table Storage
//!
//! Named flat tables persisted with sled, behind the `TableRepository` trait.
//! Loading a table that was never saved fails with `StorageError::NotFound`;
//! saving always replaces the previous table of the same name.

pub mod persistence;
mod table_store;

pub use persistence::{InMemoryStore, TableRepository};
pub use table_store::TableStore;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("table '{0}' not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupt table data: {0}")]
    Corrupt(String),
    #[error("store lock poisoned: {0}")]
    Lock(String),
}
