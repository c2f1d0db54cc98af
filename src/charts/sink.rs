//! Chart sinks: where emitted charts go

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Chart, ChartError};

/// Receiver for the chart sequence of a run
pub trait ChartSink {
    fn emit(&mut self, chart: Chart) -> Result<(), ChartError>;
}

/// Discards every chart
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ChartSink for NullSink {
    fn emit(&mut self, _chart: Chart) -> Result<(), ChartError> {
        Ok(())
    }
}

/// Collects charts in emission order
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub charts: Vec<Chart>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.charts.iter().map(Chart::kind).collect()
    }
}

impl ChartSink for MemorySink {
    fn emit(&mut self, chart: Chart) -> Result<(), ChartError> {
        self.charts.push(chart);
        Ok(())
    }
}

/// Writes each chart as pretty JSON to `NN_kind.json` in a directory
#[derive(Debug)]
pub struct JsonDirSink {
    dir: PathBuf,
    written: usize,
}

impl JsonDirSink {
    /// Create the output directory if needed
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self, ChartError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| ChartError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir, written: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of charts written so far
    pub const fn written(&self) -> usize {
        self.written
    }
}

impl ChartSink for JsonDirSink {
    fn emit(&mut self, chart: Chart) -> Result<(), ChartError> {
        self.written += 1;
        let path = self.dir.join(format!("{:02}_{}.json", self.written, chart.kind()));
        let json = serde_json::to_vec_pretty(&chart)?;
        fs::write(&path, json).map_err(|source| ChartError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), title = %chart.title(), "Wrote chart");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{HeatmapChart, ViolinChart};

    fn heatmap() -> Chart {
        Chart::Heatmap(HeatmapChart {
            title: "Heatmap of Correlations".to_string(),
            labels: vec!["Train_Y1".to_string()],
            values: vec![vec![1.0]],
        })
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.emit(heatmap()).unwrap();
        sink.emit(Chart::Violin(ViolinChart {
            title: "Violin Plot: Train vs Ideal".to_string(),
            violins: Vec::new(),
        }))
        .unwrap();
        assert_eq!(sink.kinds(), vec!["heatmap", "violin"]);
    }

    #[test]
    fn test_json_dir_sink_writes_numbered_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let out = temp_dir.path().join("charts");
        let mut sink = JsonDirSink::create(&out).unwrap();

        sink.emit(heatmap()).unwrap();
        sink.emit(heatmap()).unwrap();

        assert_eq!(sink.written(), 2);
        let written = fs::read_to_string(out.join("02_heatmap.json")).unwrap();
        let chart: Chart = serde_json::from_str(&written).unwrap();
        assert_eq!(chart, heatmap());
        assert!(out.join("01_heatmap.json").exists());
    }
}
