//! JSON output format for dataset analyses
//!
//! `--format json` emits one document covering every dataset: the per-run
//! statistics followed by the cross-run summary.

use crate::run::{Dataset, Run};
use crate::summary::DatasetSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics of a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRun {
    /// `<parent dir>/<file name>` of the log
    pub name: String,
    pub path: String,
    /// Frames the statistics cover
    pub frames: usize,
    pub duration_ms: f64,
    pub average_ms: f64,
    pub median_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    /// Percentage of frames slower than the target frame time
    pub missed_frames_percent: f64,
    pub missed_score: f64,
    /// Milliseconds spent per state (state-aware logs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_durations_ms: Option<BTreeMap<String, f64>>,
}

impl JsonRun {
    pub fn from_run(run: &Run, with_state: bool) -> Self {
        let state_durations_ms = with_state.then(|| {
            run.state_durations()
                .iter()
                .map(|(state, ms)| (state.to_string(), ms))
                .collect()
        });

        Self {
            name: run.name().to_string(),
            path: run.source_path().display().to_string(),
            frames: run.analyzed_frame_count(),
            duration_ms: run.total_duration_ms(),
            average_ms: run.average_duration_ms(),
            median_ms: run.median(),
            p90_ms: run.p90(),
            p95_ms: run.p95(),
            missed_frames_percent: run.missed_frames_percent(),
            missed_score: run.missed_score(),
            state_durations_ms,
        }
    }
}

/// One dataset: its runs and their summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDataset {
    pub runs: Vec<JsonRun>,
    pub summary: DatasetSummary,
}

/// Complete JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonAnalysisOutput {
    pub version: String,
    pub format: String,
    pub datasets: Vec<JsonDataset>,
}

impl JsonAnalysisOutput {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "framestat-json-v1".to_string(),
            datasets: Vec::new(),
        }
    }

    pub fn add_dataset(&mut self, dataset: &Dataset, summary: DatasetSummary, with_state: bool) {
        self.datasets.push(JsonDataset {
            runs: dataset
                .runs
                .iter()
                .map(|run| JsonRun::from_run(run, with_state))
                .collect(),
            summary,
        });
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for JsonAnalysisOutput {
    fn default() -> Self {
        Self::new()
    }
}
