//! Z-score normalization
//!
//! Rows with any missing cell are dropped first, then each column is centred
//! on its mean and divided by its sample standard deviation (N - 1).
//!
//! A constant column, or a table left with fewer than two complete rows, has
//! no defined standard deviation; its values come out NaN or infinite and are
//! passed on unchanged.

use statrs::statistics::Statistics;

use crate::types::{NormalizedSeries, NormalizedTable, Series, Table};

/// Normalize every column of `table` (X included) to zero mean, unit variance
pub fn normalize(table: &Table) -> NormalizedTable {
    let rows = table.complete_rows();

    let dropped = table.len() - rows.len();
    if dropped > 0 {
        tracing::debug!(
            table = %table.name,
            dropped,
            kept = rows.len(),
            "Dropped rows with missing values"
        );
    }

    NormalizedTable {
        name: table.name.clone(),
        x: standardize(&table.x, &rows),
        ys: table.ys.iter().map(|y| standardize(y, &rows)).collect(),
        source_rows: rows,
    }
}

/// Standardize the cells of `series` at the given (complete) row positions
fn standardize(series: &Series, rows: &[usize]) -> NormalizedSeries {
    let kept: Vec<f64> = rows
        .iter()
        .filter_map(|&row| series.values[row])
        .collect();

    let mean = kept.iter().mean();
    let std_dev = kept.iter().std_dev();

    NormalizedSeries {
        name: series.name.clone(),
        values: kept.iter().map(|v| (v - mean) / std_dev).collect(),
    }
}
