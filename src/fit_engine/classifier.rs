//! Threshold-based test point classification
//!
//! For every test row, each considered Y cell is matched against the whole
//! best-fit ideal column for the same position, keeping the smallest absolute
//! distance. The smallest of those per-column distances decides the
//! candidate. The candidate is accepted when the distance does not exceed the
//! training deviation bound: the largest absolute gap between the training
//! column and its ideal column, scaled by sqrt(2).
//!
//! Only the first `min(test Y columns, best-fit entries)` columns are
//! considered. Surplus columns on either side are ignored.

use tracing::debug;

use super::FitError;
use crate::config::defaults::{DEVIATION_BOUND_FACTOR, DEVIATION_DECIMALS};
use crate::types::{
    Assignment, BestFit, Classification, ClassifiedRow, NormalizedSeries, NormalizedTable,
};

/// Smallest absolute distance between `value` and any cell of `column`
///
/// NaN cells are skipped. Returns NaN when nothing comparable remains.
pub fn min_distance(column: &[f64], value: f64) -> f64 {
    column
        .iter()
        .map(|v| (v - value).abs())
        .filter(|d| !d.is_nan())
        .reduce(f64::min)
        .unwrap_or(f64::NAN)
}

/// Largest absolute deviation between two aligned columns
///
/// A NaN anywhere makes the result NaN, so an undefined training column never
/// accepts a test point.
pub fn max_abs_deviation(a: &NormalizedSeries, b: &NormalizedSeries) -> Result<f64, FitError> {
    if a.values.len() != b.values.len() {
        return Err(FitError::LengthMismatch {
            left: a.name.clone(),
            left_len: a.values.len(),
            right: b.name.clone(),
            right_len: b.values.len(),
        });
    }

    Ok(a.values
        .iter()
        .zip(&b.values)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, |acc: f64, d| if acc.is_nan() || d.is_nan() { f64::NAN } else { acc.max(d) }))
}

/// Acceptance bound per best-fit entry: max training deviation times sqrt(2)
pub fn deviation_bounds(
    train: &NormalizedTable,
    ideal: &NormalizedTable,
    best_fit: &[BestFit],
) -> Result<Vec<f64>, FitError> {
    best_fit
        .iter()
        .enumerate()
        .map(|(position, fit)| {
            let train_col = train
                .ys
                .get(position)
                .ok_or(FitError::MissingColumn { table: train.name.clone(), index: position + 1 })?;
            let ideal_col = ideal_column(ideal, fit)?;
            Ok(max_abs_deviation(train_col, ideal_col)? * DEVIATION_BOUND_FACTOR)
        })
        .collect()
}

/// Round to the reported deviation precision
///
/// Rounds the exact binary value, so `0.0055` (stored just below the half)
/// becomes `0.005`; scaling by 1000 first would round it up.
pub fn round_deviation(value: f64) -> f64 {
    format!("{value:.prec$}", prec = DEVIATION_DECIMALS)
        .parse()
        .unwrap_or(value)
}

/// Classify every row of the normalized test table
///
/// The result has one entry per normalized test row, in row order.
pub fn classify(
    test: &NormalizedTable,
    train: &NormalizedTable,
    ideal: &NormalizedTable,
    best_fit: &[BestFit],
) -> Result<Classification, FitError> {
    let considered = test.ys.len().min(best_fit.len());
    if considered < test.ys.len() || considered < best_fit.len() {
        debug!(
            test_columns = test.ys.len(),
            best_fit = best_fit.len(),
            considered,
            "Column counts differ; comparing only the leading columns"
        );
    }

    let fits = &best_fit[..considered];
    let bounds = deviation_bounds(train, ideal, fits)?;
    let ideal_cols = fits
        .iter()
        .map(|fit| ideal_column(ideal, fit))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = (0..test.len())
        .map(|row| {
            let distances = test.ys[..considered]
                .iter()
                .zip(&ideal_cols)
                .map(|(test_col, ideal_col)| min_distance(&ideal_col.values, test_col.values[row]));

            match first_minimum(distances) {
                Some((best_idx, distance)) => {
                    let assignment = if distance <= bounds[best_idx] {
                        Assignment::Ideal(fits[best_idx].ideal_index)
                    } else {
                        Assignment::Unassigned
                    };
                    ClassifiedRow {
                        assignment,
                        deviation: Some(round_deviation(distance)),
                    }
                }
                None => ClassifiedRow::unmatched(),
            }
        })
        .collect();

    Ok(Classification { rows })
}

/// Position and value of the first smallest element
fn first_minimum(values: impl Iterator<Item = f64>) -> Option<(usize, f64)> {
    values.enumerate().fold(None, |best, (i, v)| match best {
        Some((_, b)) if v >= b || v.is_nan() => best,
        _ => Some((i, v)),
    })
}

pub(crate) fn ideal_column<'a>(
    ideal: &'a NormalizedTable,
    fit: &BestFit,
) -> Result<&'a NormalizedSeries, FitError> {
    ideal.column(fit.ideal_index).ok_or(FitError::MissingColumn {
        table: ideal.name.clone(),
        index: fit.ideal_index,
    })
}
