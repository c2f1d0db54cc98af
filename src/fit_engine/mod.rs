//! Fit Engine: ideal function selection and test point classification
//!
//! ## Stages
//! - `normalizer`: drop incomplete rows, z-score every column (sample std)
//! - `selector`: least-squares choice of one ideal column per training column
//! - `classifier`: nearest selected ideal column per test row, accepted under
//!   the training deviation bound (max |train - ideal| * sqrt(2))
//!
//! All stages are pure functions over in-memory tables.

pub mod normalizer;
pub mod selector;
pub mod classifier;

pub use normalizer::normalize;
pub use selector::{select_best_fit, sum_squared_error};
pub use classifier::{classify, deviation_bounds, min_distance, round_deviation};

/// Fit engine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    #[error("length mismatch: column '{left}' has {left_len} rows, column '{right}' has {right_len}")]
    LengthMismatch {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },
    #[error("table '{0}' has no Y columns to fit against")]
    NoIdealColumns(String),
    #[error("table '{table}' has no column at index {index}")]
    MissingColumn { table: String, index: usize },
}
