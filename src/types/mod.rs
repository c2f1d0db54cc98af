//! Shared data structures for ideal function fitting
//!
//! - `Table` / `Series`: raw datasets with an explicit X column
//! - `NormalizedTable`: zero-mean, unit-variance working copy
//! - `BestFit`, `Classification`: fit engine outputs
//! - `RecordTable`: the flat table persisted by the store

mod table;
mod fit;
mod record;

pub use table::*;
pub use fit::*;
pub use record::*;
