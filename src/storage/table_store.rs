//! sled-backed table store
//!
//! Every saved version of a table gets its own sled tree named
//! `table/{name}#{generation:016x}`:
//! - key `meta`: JSON `TableMeta` (column names and kinds, row count, save time)
//! - key `row/{u64 big-endian}`: JSON array with one cell per column
//!
//! The `catalog` tree maps each table name to the tree holding its current
//! version. A save fills a fresh tree, then repoints the catalog entry with a
//! single insert and only then drops the previous tree, so readers see either
//! the old table or the new one. Trees no catalog entry points at are left
//! over from an interrupted save and are removed on open.
//!
//! Big-endian row keys keep `scan_prefix` in row order. Non-finite floats are
//! not representable in JSON and come back as missing cells.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{StorageError, TableRepository};
use crate::types::{ColumnKind, ColumnValues, RecordColumn, RecordTable};

const TREE_PREFIX: &str = "table/";
const CATALOG_TREE: &str = "catalog";
const META_KEY: &[u8] = b"meta";
const ROW_PREFIX: &[u8] = b"row/";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnMeta {
    name: String,
    kind: ColumnKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableMeta {
    name: String,
    columns: Vec<ColumnMeta>,
    row_count: usize,
    saved_at: DateTime<Utc>,
}

/// Durable named-table store
///
/// Open with [`TableStore::open`], pass by reference, and release with
/// [`TableStore::close`] (or drop, which flushes in the background).
pub struct TableStore {
    db: sled::Db,
    catalog: sled::Tree,
}

impl TableStore {
    /// Open or create the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path_ref = path.as_ref();
        let store = Self::from_db(sled::open(path_ref)?)?;

        info!("Table store opened at {:?}", path_ref);

        Ok(store)
    }

    /// Open a store that is deleted when dropped
    pub fn open_temporary() -> Result<Self, StorageError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let catalog = db.open_tree(CATALOG_TREE)?;
        let store = Self { db, catalog };
        store.remove_orphans()?;
        Ok(store)
    }

    /// Drop table trees the catalog does not point at
    fn remove_orphans(&self) -> Result<(), StorageError> {
        let mut live = Vec::new();
        for entry in self.catalog.iter() {
            let (_name, tree) = entry?;
            live.push(tree);
        }

        let orphans: Vec<sled::IVec> = self
            .db
            .tree_names()
            .into_iter()
            .filter(|t| t.starts_with(TREE_PREFIX.as_bytes()) && !live.contains(t))
            .collect();

        for orphan in &orphans {
            self.db.drop_tree(orphan)?;
            warn!(tree = %String::from_utf8_lossy(orphan), "Removed tree left by an interrupted save");
        }
        if !orphans.is_empty() {
            self.db.flush()?;
        }
        Ok(())
    }

    /// Tree holding the current version of `name`, if the table exists
    fn current_tree(&self, name: &str) -> Result<Option<sled::Tree>, StorageError> {
        match self.catalog.get(name.as_bytes())? {
            Some(tree) => Ok(Some(self.db.open_tree(tree)?)),
            None => Ok(None),
        }
    }

    /// Flush pending writes and release the store
    pub fn close(self) -> Result<(), StorageError> {
        let bytes = self.db.flush()?;
        debug!(bytes, "Table store flushed on close");
        Ok(())
    }

    /// Remove a table; returns whether it existed
    pub fn drop_table(&self, name: &str) -> Result<bool, StorageError> {
        let Some(tree) = self.catalog.remove(name.as_bytes())? else {
            return Ok(false);
        };
        self.db.flush()?;
        self.db.drop_tree(&tree)?;
        self.db.flush()?;
        info!(table = %name, "Dropped table");
        Ok(true)
    }
}

impl TableRepository for TableStore {
    fn save_table(&self, table: &RecordTable) -> Result<(), StorageError> {
        let row_count = table.row_count();
        let meta = TableMeta {
            name: table.name.clone(),
            columns: table
                .columns
                .iter()
                .map(|c| ColumnMeta {
                    name: c.name.clone(),
                    kind: c.values.kind(),
                })
                .collect(),
            row_count,
            saved_at: Utc::now(),
        };

        // Serialize everything before writing anything
        let mut batch = sled::Batch::default();
        batch.insert(META_KEY, serde_json::to_vec(&meta)?);
        for row in 0..row_count {
            let cells: Vec<Value> = table.columns.iter().map(|c| encode_cell(&c.values, row)).collect();
            batch.insert(row_key(row), serde_json::to_vec(&cells)?);
        }

        let staged = tree_name(&table.name, self.db.generate_id()?);
        let tree = self.db.open_tree(&staged)?;
        if let Err(e) = tree.apply_batch(batch).and_then(|()| self.db.flush().map(|_| ())) {
            // the catalog still points at the previous version
            let _ = self.db.drop_tree(&staged);
            return Err(e.into());
        }

        let previous = self.catalog.insert(table.name.as_bytes(), staged.as_bytes())?;
        self.db.flush()?;

        if let Some(previous) = previous {
            self.db.drop_tree(&previous)?;
            self.db.flush()?;
        }

        info!(
            table = %table.name,
            rows = row_count,
            columns = table.columns.len(),
            "Saved table"
        );

        Ok(())
    }

    fn load_table(&self, name: &str) -> Result<RecordTable, StorageError> {
        let tree = self
            .current_tree(name)?
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        let meta_bytes = tree
            .get(META_KEY)?
            .ok_or_else(|| StorageError::Corrupt(format!("table '{name}' has no metadata")))?;
        let meta: TableMeta = serde_json::from_slice(&meta_bytes)?;

        let mut columns: Vec<RecordColumn> = meta
            .columns
            .iter()
            .map(|c| RecordColumn {
                name: c.name.clone(),
                values: match c.kind {
                    ColumnKind::Float => ColumnValues::Float(Vec::with_capacity(meta.row_count)),
                    ColumnKind::Text => ColumnValues::Text(Vec::with_capacity(meta.row_count)),
                },
            })
            .collect();

        let mut rows_read = 0;
        for item in tree.scan_prefix(ROW_PREFIX) {
            let (_key, value) = item?;
            let cells: Vec<Value> = serde_json::from_slice(&value)?;
            if cells.len() != columns.len() {
                return Err(StorageError::Corrupt(format!(
                    "table '{name}' row {rows_read} has {} cells, expected {}",
                    cells.len(),
                    columns.len()
                )));
            }
            for (column, cell) in columns.iter_mut().zip(cells) {
                decode_cell(&mut column.values, cell).map_err(|msg| {
                    StorageError::Corrupt(format!(
                        "table '{name}' column '{}' row {rows_read}: {msg}",
                        column.name
                    ))
                })?;
            }
            rows_read += 1;
        }

        if rows_read != meta.row_count {
            return Err(StorageError::Corrupt(format!(
                "table '{name}' has {rows_read} rows, metadata says {}",
                meta.row_count
            )));
        }

        debug!(table = %name, rows = rows_read, "Loaded table");

        Ok(RecordTable {
            name: meta.name,
            columns,
            saved_at: Some(meta.saved_at),
        })
    }

    fn has_table(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.catalog.contains_key(name.as_bytes())?)
    }

    fn table_names(&self) -> Result<Vec<String>, StorageError> {
        // catalog keys iterate in byte order
        let mut names = Vec::new();
        for key in self.catalog.iter().keys() {
            let key = key?;
            let name = std::str::from_utf8(&key)
                .map_err(|e| StorageError::Corrupt(format!("catalog key is not UTF-8: {e}")))?;
            names.push(name.to_string());
        }
        Ok(names)
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}

fn tree_name(table: &str, generation: u64) -> String {
    format!("{TREE_PREFIX}{table}#{generation:016x}")
}

fn row_key(row: usize) -> Vec<u8> {
    let mut key = ROW_PREFIX.to_vec();
    key.extend_from_slice(&(row as u64).to_be_bytes());
    key
}

fn encode_cell(values: &ColumnValues, row: usize) -> Value {
    match values {
        ColumnValues::Float(v) => v[row].map_or(Value::Null, Value::from),
        ColumnValues::Text(v) => v[row].clone().map_or(Value::Null, Value::String),
    }
}

fn decode_cell(values: &mut ColumnValues, cell: Value) -> Result<(), String> {
    match (values, cell) {
        (ColumnValues::Float(v), Value::Null) => v.push(None),
        (ColumnValues::Float(v), Value::Number(n)) => {
            v.push(Some(n.as_f64().ok_or_else(|| format!("{n} is not a float"))?));
        }
        (ColumnValues::Text(v), Value::Null) => v.push(None),
        (ColumnValues::Text(v), Value::String(s)) => v.push(Some(s)),
        (_, other) => return Err(format!("unexpected cell {other}")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_table() -> RecordTable {
        RecordTable::new("result")
            .with_column("x", ColumnValues::Float(vec![Some(-0.5), Some(17.25), Some(3.0)]))
            .unwrap()
            .with_column("y", ColumnValues::Float(vec![Some(0.1), None, Some(1e-12)]))
            .unwrap()
            .with_column(
                "No. of ideal func",
                ColumnValues::Text(vec![Some("Y42".to_string()), Some("Unassigned".to_string()), None]),
            )
            .unwrap()
    }

    #[test]
    fn test_store_open() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = TableStore::open(temp_dir.path()).unwrap();
        assert!(store.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let store = TableStore::open_temporary().unwrap();
        let table = result_table();
        store.save_table(&table).unwrap();

        let loaded = store.load_table("result").unwrap();
        assert_eq!(loaded.name, table.name);
        assert_eq!(loaded.columns, table.columns);
        assert!(loaded.saved_at.is_some());
    }

    #[test]
    fn test_missing_table_not_found() {
        let store = TableStore::open_temporary().unwrap();
        let err = store.load_table("ideal_data").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(ref n) if n == "ideal_data"));
    }

    #[test]
    fn test_save_replaces_existing_rows() {
        let store = TableStore::open_temporary().unwrap();
        store.save_table(&result_table()).unwrap();

        let smaller = RecordTable::new("result")
            .with_column("x", ColumnValues::Float(vec![Some(9.0)]))
            .unwrap();
        store.save_table(&smaller).unwrap();

        let loaded = store.load_table("result").unwrap();
        assert_eq!(loaded.columns, smaller.columns);
    }

    #[test]
    fn test_table_names_and_drop() {
        let store = TableStore::open_temporary().unwrap();
        store.save_table(&result_table()).unwrap();
        store.save_table(&result_table().renamed("archive")).unwrap();

        assert_eq!(store.table_names().unwrap(), vec!["archive", "result"]);
        assert!(store.drop_table("archive").unwrap());
        assert!(!store.drop_table("archive").unwrap());
        assert_eq!(store.table_names().unwrap(), vec!["result"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let store = TableStore::open(temp_dir.path()).unwrap();
            store.save_table(&result_table()).unwrap();
            store.close().unwrap();
        }

        let store = TableStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.load_table("result").unwrap().columns, result_table().columns);
    }

    #[test]
    fn test_row_order_beyond_256() {
        let store = TableStore::open_temporary().unwrap();
        let values: Vec<Option<f64>> = (0..300).map(|i| Some(f64::from(i))).collect();
        let table = RecordTable::new("long")
            .with_column("x", ColumnValues::Float(values.clone()))
            .unwrap();
        store.save_table(&table).unwrap();

        let loaded = store.load_table("long").unwrap();
        assert_eq!(loaded.column("x"), Some(&ColumnValues::Float(values)));
    }

    fn table_trees(store: &TableStore) -> Vec<String> {
        store
            .db
            .tree_names()
            .iter()
            .filter(|t| t.starts_with(TREE_PREFIX.as_bytes()))
            .map(|t| String::from_utf8_lossy(t).into_owned())
            .collect()
    }

    #[test]
    fn test_overwrite_keeps_one_complete_version() {
        let store = TableStore::open_temporary().unwrap();
        store.save_table(&result_table()).unwrap();
        let first_tree = table_trees(&store);
        assert_eq!(first_tree.len(), 1);

        let smaller = RecordTable::new("result")
            .with_column("x", ColumnValues::Float(vec![Some(9.0)]))
            .unwrap();
        store.save_table(&smaller).unwrap();

        // new version under a fresh tree, previous one gone
        let second_tree = table_trees(&store);
        assert_eq!(second_tree.len(), 1);
        assert_ne!(first_tree, second_tree);
        assert_eq!(store.load_table("result").unwrap().columns, smaller.columns);
    }

    #[test]
    fn test_interrupted_save_leaves_previous_table() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let store = TableStore::open(temp_dir.path()).unwrap();
            store.save_table(&result_table()).unwrap();

            // a save that wrote part of its rows and never reached the catalog
            let staged = store.db.open_tree(tree_name("result", u64::MAX)).unwrap();
            staged.insert(row_key(0), b"[1.0]".to_vec()).unwrap();

            assert_eq!(store.table_names().unwrap(), vec!["result"]);
            assert_eq!(store.load_table("result").unwrap().columns, result_table().columns);
            store.close().unwrap();
        }

        let store = TableStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.load_table("result").unwrap().columns, result_table().columns);
        assert_eq!(table_trees(&store).len(), 1);
    }

    #[test]
    fn test_dropped_table_is_not_found() {
        let store = TableStore::open_temporary().unwrap();
        store.save_table(&result_table()).unwrap();
        assert!(store.drop_table("result").unwrap());

        assert!(!store.has_table("result").unwrap());
        assert!(table_trees(&store).is_empty());
        let err = store.load_table("result").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
