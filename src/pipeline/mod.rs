//! Fit-and-classify Pipeline
//!
//! ```text
//! STAGE 1: Load       train / ideal / test tables (store or caller)
//! STAGE 2: Normalize  drop incomplete rows, z-score every column
//! STAGE 3: Select     least-squares ideal column per training column
//! STAGE 4: Charts     diagnostic chart sequence to the sink
//! STAGE 5: Classify   nearest selected ideal column per test row
//! STAGE 6: Assemble   raw test columns + label + deviation
//! STAGE 7: Save       replace the result table (store runs only)
//! ```
//!
//! A run is all-or-nothing: nothing is saved unless every stage before the
//! save succeeds, chart output included. Charts never change the result.

mod coordinator;

pub use coordinator::{import_csv_inputs, run, run_with_store, PipelineOutput, PipelineStats};

use crate::acquisition::IngestError;
use crate::charts::ChartError;
use crate::fit_engine::FitError;
use crate::storage::StorageError;
use crate::types::TableError;

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fit(#[from] FitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Chart(#[from] ChartError),
}
