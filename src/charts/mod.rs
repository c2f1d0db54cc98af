//! Diagnostic charts
//!
//! Charts are plain serde values describing what to draw: titles, axis labels
//! and numeric series. [`build_charts`] produces the fixed chart sequence for
//! a best-fit mapping and a [`ChartSink`] decides where the charts go.
//! Rendering happens outside this crate.

pub mod builder;
mod sink;
pub mod summary;

use serde::{Deserialize, Serialize};

pub use builder::build_charts;
pub use sink::{ChartSink, JsonDirSink, MemorySink, NullSink};
pub use summary::{BoxSummary, HistogramBin};

/// Chart output errors
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart output '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("chart serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How a series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    Solid,
    /// Solid line with point markers
    Markers,
    Dashed,
    Points,
    Stem,
    Filled,
}

/// One drawable x/y series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub name: String,
    pub style: SeriesStyle,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Chart over a shared pair of axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XyChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<PlotSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotChart {
    pub title: String,
    pub boxes: Vec<BoxSummary>,
}

/// Grouped bars: one value per category in every group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub categories: Vec<String>,
    pub groups: Vec<BarGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGroup {
    pub name: String,
    pub values: Vec<f64>,
}

/// Kernel density estimate of one column, evaluated on `grid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violin {
    pub name: String,
    pub grid: Vec<f64>,
    pub density: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolinChart {
    pub title: String,
    pub violins: Vec<Violin>,
}

/// Square matrix; `values[i][j]` pairs `labels[i]` with `labels[j]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapChart {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// A single diagnostic chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Line(XyChart),
    Scatter(XyChart),
    Residual(XyChart),
    Histogram(HistogramChart),
    Boxplot(BoxplotChart),
    Overlay(XyChart),
    Area(XyChart),
    Bar(BarChart),
    Violin(ViolinChart),
    Heatmap(HeatmapChart),
}

impl Chart {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::Scatter(_) => "scatter",
            Self::Residual(_) => "residual",
            Self::Histogram(_) => "histogram",
            Self::Boxplot(_) => "boxplot",
            Self::Overlay(_) => "overlay",
            Self::Area(_) => "area",
            Self::Bar(_) => "bar",
            Self::Violin(_) => "violin",
            Self::Heatmap(_) => "heatmap",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Line(c) | Self::Scatter(c) | Self::Residual(c) | Self::Overlay(c) | Self::Area(c) => &c.title,
            Self::Histogram(c) => &c.title,
            Self::Boxplot(c) => &c.title,
            Self::Bar(c) => &c.title,
            Self::Violin(c) => &c.title,
            Self::Heatmap(c) => &c.title,
        }
    }
}
