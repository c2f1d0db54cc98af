//! Descriptive statistics behind the distribution charts
//!
//! Non-finite values (from constant columns) are skipped by every summary here.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Equal-width histogram bin; the last bin includes its upper edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Box-and-whisker summary of one column
///
/// Whiskers reach the most extreme values within 1.5 IQR of the quartiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub name: String,
    pub min: f64,
    pub lower_whisker: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub upper_whisker: f64,
    pub max: f64,
    pub outliers: Vec<f64>,
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Split `values` into `bins` equal-width bins between its min and max
///
/// A single distinct value is centred in a range of width 1.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let values = finite(values);
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// Quartiles, whiskers and outliers of a column; `None` if nothing is finite
pub fn box_summary(name: &str, values: &[f64]) -> Option<BoxSummary> {
    let values = finite(values);
    if values.is_empty() {
        return None;
    }

    let n = values.len();
    let mut data = Data::new(values.clone());
    let min = data.order_statistic(1);
    let max = data.order_statistic(n);
    let lower_quartile = data.lower_quartile();
    let median = data.median();
    let upper_quartile = data.upper_quartile();

    let reach = 1.5 * (upper_quartile - lower_quartile);
    let (low_fence, high_fence) = (lower_quartile - reach, upper_quartile + reach);
    let inside = values.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
    let outliers = values
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxSummary {
        name: name.to_string(),
        min,
        lower_whisker,
        lower_quartile,
        median,
        upper_quartile,
        upper_whisker,
        max,
        outliers,
    })
}

/// Gaussian kernel density estimate on an evenly spaced grid
///
/// Bandwidth follows Scott's rule (sample std times n^-1/5). The grid spans
/// the data extended by two bandwidths on each side. Returns `None` for fewer
/// than two values or a zero-spread column.
pub fn gaussian_kde(values: &[f64], grid_points: usize) -> Option<(Vec<f64>, Vec<f64>)> {
    let values = finite(values);
    if values.len() < 2 || grid_points < 2 {
        return None;
    }

    let n = values.len() as f64;
    let bandwidth = values.iter().std_dev() * n.powf(-0.2);
    let kernel = Normal::new(0.0, bandwidth).ok()?;

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - 2.0 * bandwidth;
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 2.0 * bandwidth;
    let step = (hi - lo) / (grid_points - 1) as f64;

    let grid: Vec<f64> = (0..grid_points).map(|i| lo + step * i as f64).collect();
    let density = grid
        .iter()
        .map(|g| values.iter().map(|v| kernel.pdf(g - v)).sum::<f64>() / n)
        .collect();

    Some((grid, density))
}

/// Pearson correlation coefficient of two equal-length columns
///
/// Returns 0.0 when either column has no spread.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let mean_x = x[..n].iter().mean();
    let mean_y = y[..n].iter().mean();

    let mut num = 0.0_f64;
    let mut den_x = 0.0_f64;
    let mut den_y = 0.0_f64;

    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        num += dx * dy;
        den_x += dx * dx;
        den_y += dy * dy;
    }

    let denom = (den_x * den_y).sqrt();
    if denom.is_nan() || denom < 1e-10 {
        0.0
    } else {
        num / denom
    }
}

/// Pairwise Pearson correlations of `columns`
pub fn correlation_matrix(columns: &[&[f64]]) -> Vec<Vec<f64>> {
    columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_all_values() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let bins = histogram(&values, 10);

        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        // max lands in the last bin
        assert_eq!(bins[9].count, 2);
        assert!((bins[0].lower - 0.0).abs() < 1e-12);
        assert!((bins[9].upper - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[2.0, 2.0, f64::NAN], 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!((bins[0].lower - 1.5).abs() < 1e-12);
        assert!((bins[9].upper - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 10).is_empty());
        assert!(histogram(&[f64::INFINITY], 10).is_empty());
    }

    #[test]
    fn test_box_summary_flags_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let summary = box_summary("Train_Y1", &values).unwrap();

        assert_eq!(summary.name, "Train_Y1");
        assert!((summary.min - 1.0).abs() < 1e-12);
        assert!((summary.max - 100.0).abs() < 1e-12);
        assert!(summary.lower_quartile <= summary.median);
        assert!(summary.median <= summary.upper_quartile);
        assert_eq!(summary.outliers, vec![100.0]);
        assert!((summary.upper_whisker - 5.0).abs() < 1e-12);
        assert!((summary.lower_whisker - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_box_summary_empty() {
        assert!(box_summary("x", &[f64::NAN]).is_none());
    }

    #[test]
    fn test_kde_integrates_to_about_one() {
        let values: Vec<f64> = (0..50).map(|i| f64::from(i) / 10.0).collect();
        let (grid, density) = gaussian_kde(&values, 256).unwrap();

        assert_eq!(grid.len(), 256);
        let step = grid[1] - grid[0];
        let area: f64 = density.iter().sum::<f64>() * step;
        assert!((area - 1.0).abs() < 0.05, "area = {area}");
    }

    #[test]
    fn test_kde_degenerate() {
        assert!(gaussian_kde(&[1.0], 64).is_none());
        assert!(gaussian_kde(&[1.0, 1.0, 1.0], 64).is_none());
    }

    #[test]
    fn test_pearson() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&x, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &[4.0, 3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&x, &[5.0, 5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_correlation_matrix_is_symmetric() {
        let a = [1.0, 2.0, 3.0, 5.0];
        let b = [2.0, 1.0, 4.0, 3.0];
        let m = correlation_matrix(&[&a, &b]);

        assert!((m[0][0] - 1.0).abs() < 1e-12);
        assert!((m[0][1] - m[1][0]).abs() < 1e-12);
    }
}
