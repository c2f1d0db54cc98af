//! Chart sequence for a best-fit mapping
//!
//! Order: one line, scatter and residual chart per training column (each
//! group in training column order), then histogram, boxplot, overlay, area,
//! bar, violin and heatmap. The shared X axis is the row position in the
//! normalized training table.

use statrs::statistics::Statistics;

use super::summary::{box_summary, correlation_matrix, gaussian_kde, histogram};
use super::{
    BarChart, BarGroup, BoxplotChart, Chart, HeatmapChart, HistogramChart, PlotSeries,
    SeriesStyle, Violin, ViolinChart, XyChart,
};
use crate::config::defaults::{HISTOGRAM_BINS, SCATTER_DIAGONAL_EXTENT, VIOLIN_GRID_POINTS};
use crate::fit_engine::classifier::ideal_column;
use crate::fit_engine::FitError;
use crate::types::{BestFit, NormalizedSeries, NormalizedTable};

/// A training column and its selected ideal column
struct FitPair<'a> {
    train_label: String,
    ideal_label: String,
    train: &'a [f64],
    ideal: &'a [f64],
}

impl FitPair<'_> {
    fn residuals(&self) -> Vec<f64> {
        self.train.iter().zip(self.ideal).map(|(t, i)| t - i).collect()
    }
}

/// Build every chart for the pairs in `best_fit`
pub fn build_charts(
    train: &NormalizedTable,
    ideal: &NormalizedTable,
    best_fit: &[BestFit],
) -> Result<Vec<Chart>, FitError> {
    let pairs = resolve_pairs(train, ideal, best_fit)?;
    let x_axis: Vec<f64> = (0..train.len()).map(|row| row as f64).collect();

    let mut charts = Vec::with_capacity(pairs.len() * 3 + 7);
    charts.extend(pairs.iter().map(|p| line_chart(p, &x_axis)));
    charts.extend(pairs.iter().map(scatter_chart));
    charts.extend(pairs.iter().map(|p| residual_chart(p, &x_axis)));
    charts.push(histogram_chart(&pairs));

    let combined = combined_columns(&pairs);
    charts.push(boxplot_chart(&combined));
    charts.push(overlay_chart(&pairs, &x_axis));
    charts.push(area_chart(&pairs, &x_axis));
    charts.push(bar_chart(&pairs));
    charts.push(violin_chart(&combined));
    charts.push(heatmap_chart(&combined));

    tracing::debug!(pairs = pairs.len(), charts = charts.len(), "Built charts");
    Ok(charts)
}

fn resolve_pairs<'a>(
    train: &'a NormalizedTable,
    ideal: &'a NormalizedTable,
    best_fit: &[BestFit],
) -> Result<Vec<FitPair<'a>>, FitError> {
    best_fit
        .iter()
        .enumerate()
        .map(|(position, fit)| {
            let train_col = train.ys.get(position).ok_or(FitError::MissingColumn {
                table: train.name.clone(),
                index: position + 1,
            })?;
            let ideal_col = ideal_column(ideal, fit)?;
            check_aligned(train_col, ideal_col)?;
            Ok(FitPair {
                train_label: format!("Y{}", position + 1),
                ideal_label: format!("Y{}", fit.ideal_index),
                train: &train_col.values,
                ideal: &ideal_col.values,
            })
        })
        .collect()
}

fn check_aligned(a: &NormalizedSeries, b: &NormalizedSeries) -> Result<(), FitError> {
    if a.values.len() == b.values.len() {
        Ok(())
    } else {
        Err(FitError::LengthMismatch {
            left: a.name.clone(),
            left_len: a.values.len(),
            right: b.name.clone(),
            right_len: b.values.len(),
        })
    }
}

/// `Train_Y{n}` and `Ideal_Y{n}` columns; an ideal column chosen twice appears once
fn combined_columns<'a>(pairs: &[FitPair<'a>]) -> Vec<(String, &'a [f64])> {
    let mut combined: Vec<(String, &'a [f64])> = Vec::with_capacity(pairs.len() * 2);
    for pair in pairs {
        for (name, values) in [
            (format!("Train_{}", pair.train_label), pair.train),
            (format!("Ideal_{}", pair.ideal_label), pair.ideal),
        ] {
            if !combined.iter().any(|(existing, _)| *existing == name) {
                combined.push((name, values));
            }
        }
    }
    combined
}

fn series(name: impl Into<String>, style: SeriesStyle, x: &[f64], y: &[f64]) -> PlotSeries {
    PlotSeries {
        name: name.into(),
        style,
        x: x.to_vec(),
        y: y.to_vec(),
    }
}

fn line_chart(pair: &FitPair<'_>, x_axis: &[f64]) -> Chart {
    Chart::Line(XyChart {
        title: format!("Line Plot: Train {} vs Ideal {}", pair.train_label, pair.ideal_label),
        x_label: "X".to_string(),
        y_label: "Normalized Value".to_string(),
        series: vec![
            series("Ideal", SeriesStyle::Markers, x_axis, pair.ideal),
            series("Train", SeriesStyle::Dashed, x_axis, pair.train),
        ],
    })
}

fn scatter_chart(pair: &FitPair<'_>) -> Chart {
    let diagonal = [-SCATTER_DIAGONAL_EXTENT, SCATTER_DIAGONAL_EXTENT];
    Chart::Scatter(XyChart {
        title: format!("Scatter Plot: Train {} vs Ideal {}", pair.train_label, pair.ideal_label),
        x_label: "Ideal".to_string(),
        y_label: "Train".to_string(),
        series: vec![
            series("Train vs Ideal", SeriesStyle::Points, pair.ideal, pair.train),
            series("Reference", SeriesStyle::Dashed, &diagonal, &diagonal),
        ],
    })
}

fn residual_chart(pair: &FitPair<'_>, x_axis: &[f64]) -> Chart {
    Chart::Residual(XyChart {
        title: format!("Residuals: Train {} - Ideal {}", pair.train_label, pair.ideal_label),
        x_label: "X".to_string(),
        y_label: "Residual".to_string(),
        series: vec![series("Residual", SeriesStyle::Stem, x_axis, &pair.residuals())],
    })
}

fn histogram_chart(pairs: &[FitPair<'_>]) -> Chart {
    let deviations: Vec<f64> = pairs.iter().flat_map(FitPair::residuals).collect();
    Chart::Histogram(HistogramChart {
        title: "Histogram of Deviations".to_string(),
        x_label: "Deviation".to_string(),
        y_label: "Frequency".to_string(),
        bins: histogram(&deviations, HISTOGRAM_BINS),
    })
}

fn boxplot_chart(combined: &[(String, &[f64])]) -> Chart {
    Chart::Boxplot(BoxplotChart {
        title: "Boxplot: Train vs Ideal".to_string(),
        boxes: combined
            .iter()
            .filter_map(|(name, values)| box_summary(name, values))
            .collect(),
    })
}

fn overlay_series(pairs: &[FitPair<'_>], x_axis: &[f64], train: SeriesStyle, ideal: SeriesStyle) -> Vec<PlotSeries> {
    pairs
        .iter()
        .flat_map(|p| {
            [
                series(format!("Train {}", p.train_label), train, x_axis, p.train),
                series(format!("Ideal {}", p.ideal_label), ideal, x_axis, p.ideal),
            ]
        })
        .collect()
}

fn overlay_chart(pairs: &[FitPair<'_>], x_axis: &[f64]) -> Chart {
    Chart::Overlay(XyChart {
        title: "Combined Overlay".to_string(),
        x_label: "X".to_string(),
        y_label: "Normalized Value".to_string(),
        series: overlay_series(pairs, x_axis, SeriesStyle::Dashed, SeriesStyle::Markers),
    })
}

fn area_chart(pairs: &[FitPair<'_>], x_axis: &[f64]) -> Chart {
    Chart::Area(XyChart {
        title: "Area Plot".to_string(),
        x_label: "X".to_string(),
        y_label: "Normalized Value".to_string(),
        series: overlay_series(pairs, x_axis, SeriesStyle::Filled, SeriesStyle::Filled),
    })
}

fn bar_chart(pairs: &[FitPair<'_>]) -> Chart {
    Chart::Bar(BarChart {
        title: "Bar Plot of Mean Values".to_string(),
        categories: pairs
            .iter()
            .map(|p| format!("Train {} / Ideal {}", p.train_label, p.ideal_label))
            .collect(),
        groups: vec![
            BarGroup {
                name: "Train".to_string(),
                values: pairs.iter().map(|p| p.train.iter().mean()).collect(),
            },
            BarGroup {
                name: "Ideal".to_string(),
                values: pairs.iter().map(|p| p.ideal.iter().mean()).collect(),
            },
        ],
    })
}

fn violin_chart(combined: &[(String, &[f64])]) -> Chart {
    Chart::Violin(ViolinChart {
        title: "Violin Plot: Train vs Ideal".to_string(),
        violins: combined
            .iter()
            .map(|(name, values)| {
                let (grid, density) = gaussian_kde(values, VIOLIN_GRID_POINTS).unwrap_or_default();
                Violin {
                    name: name.clone(),
                    grid,
                    density,
                }
            })
            .collect(),
    })
}

fn heatmap_chart(combined: &[(String, &[f64])]) -> Chart {
    let columns: Vec<&[f64]> = combined.iter().map(|(_, values)| *values).collect();
    Chart::Heatmap(HeatmapChart {
        title: "Heatmap of Correlations".to_string(),
        labels: combined.iter().map(|(name, _)| name.clone()).collect(),
        values: correlation_matrix(&columns),
    })
}
