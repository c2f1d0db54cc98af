//! Data acquisition module
//!
//! Reads the training, ideal and test datasets from CSV and writes stored
//! tables back out as CSV.

pub mod csv_table;

pub use csv_table::{read_table, read_table_file, write_record_table, IngestError};
