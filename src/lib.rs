//! ideal-fit: Ideal Function Selection and Test Point Classification
//!
//! Picks, for every training series, the ideal function that fits it best by
//! least squares, then assigns test points to those ideal functions when they
//! fall within the training deviation scaled by sqrt(2).
//!
//! ## Architecture
//!
//! - **Acquisition**: CSV ingestion and export
//! - **Fit Engine**: normalization, best-fit selection, classification
//! - **Storage**: named tables in sled behind `TableRepository`
//! - **Charts**: diagnostic chart data emitted to a `ChartSink`
//! - **Pipeline**: composes the stages and persists the result table

pub mod config;
pub mod types;
pub mod acquisition;
pub mod fit_engine;
pub mod storage;
pub mod charts;
pub mod pipeline;

// Re-export configuration
pub use config::{AppConfig, ConfigError};

// Re-export commonly used types
pub use types::{
    Assignment, BestFit, Classification, ClassifiedRow, ColumnValues, NormalizedTable,
    RecordTable, Series, Table, UNASSIGNED_LABEL,
};

// Re-export fit engine entry points
pub use fit_engine::{classify, normalize, select_best_fit, FitError};

// Re-export storage
pub use storage::{InMemoryStore, StorageError, TableRepository, TableStore};

// Re-export pipeline
pub use pipeline::{import_csv_inputs, run, run_with_store, PipelineError, PipelineOutput};
