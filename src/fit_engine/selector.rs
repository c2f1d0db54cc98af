//! Least-squares best-fit selection
//!
//! Every training Y column is compared against every ideal Y column by sum of
//! squared error. The smallest error wins; on ties the lower column index is
//! kept. A NaN error (a zero-variance column after normalization) never beats
//! a finite one, wherever it sits; only when every error is NaN is the first
//! ideal column kept. Cost is O(T * D * R), fine for the small tables this
//! runs on once.

use tracing::debug;

use super::FitError;
use crate::types::{BestFit, NormalizedSeries, NormalizedTable};

/// Sum of squared differences between two equally long columns
pub fn sum_squared_error(a: &NormalizedSeries, b: &NormalizedSeries) -> Result<f64, FitError> {
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
        .map(|(x, y)| (x - y).powi(2))
        .sum())
}

/// Strict comparison keeps the first minimum; NaN only fills an empty slot
fn improves_on(error: f64, best: Option<f64>) -> bool {
    match best {
        None => true,
        Some(best) if best.is_nan() => !error.is_nan(),
        Some(best) => error < best,
    }
}

/// Select, for each training Y column, the ideal column with least squared error
///
/// Returned entries follow training column order. `ideal_index` counts the
/// ideal X column as 0, so the first ideal Y column is index 1.
pub fn select_best_fit(
    train: &NormalizedTable,
    ideal: &NormalizedTable,
) -> Result<Vec<BestFit>, FitError> {
    if ideal.ys.is_empty() {
        return Err(FitError::NoIdealColumns(ideal.name.clone()));
    }

    let mut best_fit = Vec::with_capacity(train.ys.len());

    for train_col in &train.ys {
        let mut winner: Option<(usize, f64)> = None;

        for (offset, ideal_col) in ideal.ys.iter().enumerate() {
            let error = sum_squared_error(train_col, ideal_col)?;
            if improves_on(error, winner.map(|(_, best)| best)) {
                winner = Some((offset, error));
            }
        }

        if let Some((offset, error)) = winner {
            let fit = BestFit {
                train_column: train_col.name.clone(),
                ideal_index: offset + 1,
                ideal_column: ideal.ys[offset].name.clone(),
                sum_squared_error: error,
            };
            debug!(
                train = %fit.train_column,
                ideal = %fit.ideal_column,
                ideal_index = fit.ideal_index,
                sse = fit.sum_squared_error,
                "Selected best fit"
            );
            best_fit.push(fit);
        }
    }

    Ok(best_fit)
}
