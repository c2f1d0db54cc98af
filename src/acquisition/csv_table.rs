//! CSV ingestion and export
//!
//! Input files carry a header row; the first column is X, the rest are Y
//! series. Empty cells and the usual NA spellings (`NaN`, `NA`, `null`, ...)
//! become missing values. Any other non-numeric cell is an error.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::types::{ColumnValues, RecordTable, Series, Table, TableError};

/// Cell spellings read as missing values
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// CSV ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("column '{column}' row {row}: '{value}' is not a number")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Whether a raw cell counts as a missing value
pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Parse a CSV document into a [`Table`] named `name`
pub fn read_table<R: Read>(name: &str, reader: R) -> Result<Table, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        for (i, field) in record.iter().enumerate() {
            let value = if is_missing(field) {
                None
            } else {
                Some(field.parse::<f64>().map_err(|_| IngestError::NonNumeric {
                    column: headers.get(i).unwrap_or_default().to_string(),
                    row,
                    value: field.to_string(),
                })?)
            };
            columns[i].push(value);
        }
    }

    let series = headers
        .iter()
        .zip(columns)
        .map(|(header, values)| Series::new(header, values))
        .collect();

    let table = Table::from_columns(name, series)?;
    debug!(
        table = %name,
        rows = table.len(),
        y_columns = table.y_count(),
        "Parsed CSV table"
    );
    Ok(table)
}

/// Read a CSV file into a [`Table`] named `name`
pub fn read_table_file(name: &str, path: &Path) -> Result<Table, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_table(name, file)
}

/// Write any stored table as CSV with a header row
///
/// Missing cells are written as empty fields.
pub fn write_record_table<W: Write>(table: &RecordTable, writer: W) -> Result<(), IngestError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.column_names())?;

    for row in 0..table.row_count() {
        let fields = table.columns.iter().map(|c| match &c.values {
            ColumnValues::Float(v) => v[row].map(|f| f.to_string()).unwrap_or_default(),
            ColumnValues::Text(v) => v[row].clone().unwrap_or_default(),
        });
        writer.write_record(fields)?;
    }

    writer.flush()?;
    Ok(())
}
