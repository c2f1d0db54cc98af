//! Table types: raw `Table` with missing values and the derived `NormalizedTable`.
//!
//! The independent variable is carried in an explicit `x` field. Dependent
//! series live in `ys`, in source column order. Ideal-column indices used by
//! the fit engine count `x` as index 0 and `ys[k]` as index `k + 1`; use
//! [`NormalizedTable::column`] to resolve them.

use serde::{Deserialize, Serialize};

/// Errors raised while assembling a table from columns
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("table '{0}' has no columns")]
    NoColumns(String),
    #[error("column '{column}' in table '{table}' has {found} rows, expected {expected}")]
    RaggedColumn {
        table: String,
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("column '{column}' in table '{table}' is not numeric")]
    NonNumericColumn { table: String, column: String },
}

/// A named numeric column with optional (missing) cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Build a series with no missing cells
    pub fn complete(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().copied().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Raw tabular dataset: one X column plus one or more Y columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub x: Series,
    pub ys: Vec<Series>,
}

impl Table {
    /// Create a table, checking that every Y column aligns with X
    pub fn new(name: impl Into<String>, x: Series, ys: Vec<Series>) -> Result<Self, TableError> {
        let name = name.into();
        let expected = x.len();

        if let Some(bad) = ys.iter().find(|y| y.len() != expected) {
            return Err(TableError::RaggedColumn {
                table: name,
                column: bad.name.clone(),
                expected,
                found: bad.len(),
            });
        }

        Ok(Self { name, x, ys })
    }

    /// Create a table from an ordered column list; the first column is X
    pub fn from_columns(name: impl Into<String>, columns: Vec<Series>) -> Result<Self, TableError> {
        let name = name.into();
        let mut columns = columns.into_iter();
        let x = columns.next().ok_or_else(|| TableError::NoColumns(name.clone()))?;
        Self::new(name, x, columns.collect())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Number of dependent (Y) columns
    pub fn y_count(&self) -> usize {
        self.ys.len()
    }

    /// All columns in source order, X first
    pub fn columns(&self) -> impl Iterator<Item = &Series> {
        std::iter::once(&self.x).chain(self.ys.iter())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns().map(|c| c.name.clone()).collect()
    }

    /// Positions of rows where no column has a missing value
    pub fn complete_rows(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&row| self.columns().all(|c| c.values[row].is_some()))
            .collect()
    }
}

/// A fully populated numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Zero-mean, unit-variance view of a [`Table`] after dropping incomplete rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    pub name: String,
    pub x: NormalizedSeries,
    pub ys: Vec<NormalizedSeries>,
    /// Row position in the source table for every surviving row
    pub source_rows: Vec<usize>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.source_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_rows.is_empty()
    }

    pub fn y_count(&self) -> usize {
        self.ys.len()
    }

    /// Resolve a column by table index: 0 is X, `k` is `ys[k - 1]`
    pub fn column(&self, index: usize) -> Option<&NormalizedSeries> {
        match index {
            0 => Some(&self.x),
            k => self.ys.get(k - 1),
        }
    }
}
