//! Flat persisted table: the unit the table store reads and writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::table::{Series, Table, TableError};

/// Cell values of one stored column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnValues {
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn kind(&self) -> ColumnKind {
        match self {
            Self::Float(_) => ColumnKind::Float,
            Self::Text(_) => ColumnKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Float,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordColumn {
    pub name: String,
    pub values: ColumnValues,
}

/// An ordered set of equally long named columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTable {
    pub name: String,
    pub columns: Vec<RecordColumn>,
    /// Set by the store when the table is written
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl RecordTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            saved_at: None,
        }
    }

    /// Number of rows (0 for a table without columns)
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnValues> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.values)
    }

    /// Append a column; its length must match the existing rows
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: ColumnValues,
    ) -> Result<(), TableError> {
        let name = name.into();
        if !self.columns.is_empty() && values.len() != self.row_count() {
            return Err(TableError::RaggedColumn {
                table: self.name.clone(),
                column: name,
                expected: self.row_count(),
                found: values.len(),
            });
        }
        self.columns.push(RecordColumn { name, values });
        Ok(())
    }

    /// Builder form of [`push_column`](Self::push_column)
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: ColumnValues,
    ) -> Result<Self, TableError> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Copy under a different table name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

impl From<&Table> for RecordTable {
    fn from(table: &Table) -> Self {
        Self {
            name: table.name.clone(),
            columns: table
                .columns()
                .map(|s| RecordColumn {
                    name: s.name.clone(),
                    values: ColumnValues::Float(s.values.clone()),
                })
                .collect(),
            saved_at: None,
        }
    }
}

impl TryFrom<RecordTable> for Table {
    type Error = TableError;

    fn try_from(record: RecordTable) -> Result<Self, Self::Error> {
        let table_name = record.name;
        let columns = record
            .columns
            .into_iter()
            .map(|c| match c.values {
                ColumnValues::Float(values) => Ok(Series::new(c.name, values)),
                ColumnValues::Text(_) => Err(TableError::NonNumericColumn {
                    table: table_name.clone(),
                    column: c.name,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_columns(table_name, columns)
    }
}
