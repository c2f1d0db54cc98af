//! Fit engine outputs: best-fit mapping entries and per-row classifications

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label written for test rows no ideal function accommodates
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// The ideal column selected for one training column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestFit {
    /// Training column name
    pub train_column: String,
    /// Selected ideal column index (X = 0, first Y = 1)
    pub ideal_index: usize,
    /// Selected ideal column name
    pub ideal_column: String,
    /// Sum of squared error of the winning pair
    pub sum_squared_error: f64,
}

/// Outcome of classifying one test row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assignment {
    /// Assigned to the ideal column at this index
    Ideal(usize),
    Unassigned,
}

impl Assignment {
    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Ideal(_))
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ideal(index) => write!(f, "Y{index}"),
            Self::Unassigned => f.write_str(UNASSIGNED_LABEL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRow {
    pub assignment: Assignment,
    /// Minimum distance rounded to 3 decimals; `None` when nothing was compared
    pub deviation: Option<f64>,
}

impl ClassifiedRow {
    pub const fn unmatched() -> Self {
        Self {
            assignment: Assignment::Unassigned,
            deviation: None,
        }
    }
}

/// Classification of every test row, in input row order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub rows: Vec<ClassifiedRow>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.assignment.to_string()).collect()
    }

    pub fn deviations(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.deviation).collect()
    }

    pub fn assigned_count(&self) -> usize {
        self.rows.iter().filter(|r| r.assignment.is_assigned()).count()
    }
}
