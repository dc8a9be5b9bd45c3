// Dataset summarization
//
// Steps:
// 1. Rank runs by median frame time
// 2. Bound the medians by their 5th/95th percentile; runs strictly inside
//    the band form the stable subset
// 3. Reduce every per-run series with every metric (stable subset only when
//    outlier trimming is on and the subset is not empty)
// 4. Pick the low/median/high representative runs

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::frame_log::DEFAULT_STATE;
use crate::percentiles::percentile_sorted;
use crate::run::{Dataset, Run};
use crate::summary::metric::{MetricKind, SummaryMetric};
use crate::summary::representatives::{RepresentativeRuns, RunRef};
use serde::{Deserialize, Serialize};

/// Per-run values a metric can be applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Average,
    Median,
    P90,
    P95,
    MissedFrames,
    MissedScore,
    TimeInState,
}

impl SeriesKind {
    /// Value of this series for one run
    pub fn extract(self, run: &Run) -> f64 {
        match self {
            Self::Average => run.average_duration_ms(),
            Self::Median => run.median(),
            Self::P90 => run.p90(),
            Self::P95 => run.p95(),
            Self::MissedFrames => run.missed_frames_percent(),
            Self::MissedScore => run.missed_score(),
            Self::TimeInState => run.time_in_state(DEFAULT_STATE),
        }
    }
}

/// One aggregated value per series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesValues {
    pub average: f64,
    pub median: f64,
    pub p90: f64,
    pub p95: f64,
    pub missed_frames: f64,
    /// Present when the missed score is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missed_score: Option<f64>,
    /// Time in the default state; present for state-aware logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_state: Option<f64>,
}

impl SeriesValues {
    fn compute(
        metric: &SummaryMetric,
        runs: &[&Run],
        with_missed_score: bool,
        with_state: bool,
    ) -> Self {
        let reduce = |kind: SeriesKind| {
            let series: Vec<f64> = runs.iter().map(|run| kind.extract(run)).collect();
            metric.apply(&series)
        };

        Self {
            average: reduce(SeriesKind::Average),
            median: reduce(SeriesKind::Median),
            p90: reduce(SeriesKind::P90),
            p95: reduce(SeriesKind::P95),
            missed_frames: reduce(SeriesKind::MissedFrames),
            missed_score: with_missed_score.then(|| reduce(SeriesKind::MissedScore)),
            time_in_state: with_state.then(|| reduce(SeriesKind::TimeInState)),
        }
    }
}

/// A metric applied to every series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: String,
    pub kind: MetricKind,
    pub values: SeriesValues,
}

/// Cross-run summary of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub dataset: String,
    pub run_count: usize,
    pub failed_runs: usize,
    /// Runs ordered by median frame time, fastest first
    pub sorted_runs: Vec<RunRef>,
    /// 5th percentile of the run medians (ms)
    pub low_bound_ms: f64,
    /// 95th percentile of the run medians (ms)
    pub high_bound_ms: f64,
    /// Runs whose median lies strictly between the bounds
    pub stable_runs: Vec<RunRef>,
    /// Whether the aggregators only saw the stable subset
    pub outlier_trimming_applied: bool,
    pub metrics: Vec<MetricSummary>,
    pub representatives: RepresentativeRuns,
}

impl DatasetSummary {
    /// Runs whose median lies outside the stable band
    pub fn outliers(&self) -> impl Iterator<Item = &RunRef> {
        self.sorted_runs
            .iter()
            .filter(|r| !self.stable_runs.iter().any(|s| s.index == r.index))
    }
}

/// Summarize a dataset's runs with the given metrics
pub fn summarize(
    dataset: &Dataset,
    metrics: &[SummaryMetric],
    config: &AnalysisConfig,
) -> Result<DatasetSummary> {
    if dataset.runs.is_empty() {
        return Err(AnalysisError::EmptyDataset {
            name: dataset.name.clone(),
        });
    }

    // Step 1: rank by median
    let mut sorted_runs: Vec<RunRef> = dataset
        .runs
        .iter()
        .enumerate()
        .map(|(index, run)| RunRef {
            index,
            name: run.name().to_string(),
            median_ms: run.median(),
        })
        .collect();
    sorted_runs.sort_by(|a, b| a.median_ms.total_cmp(&b.median_ms));

    // Step 2: stable band of the medians
    let medians: Vec<f64> = sorted_runs.iter().map(|r| r.median_ms).collect();
    let low_bound_ms = percentile_sorted(&medians, 5.0).unwrap_or(f64::NAN);
    let high_bound_ms = percentile_sorted(&medians, 95.0).unwrap_or(f64::NAN);

    let stable_runs: Vec<RunRef> = sorted_runs
        .iter()
        .filter(|r| r.median_ms > low_bound_ms && r.median_ms < high_bound_ms)
        .cloned()
        .collect();

    // Step 3: aggregate
    let outlier_trimming_applied = config.outlier_trimming && !stable_runs.is_empty();
    let considered = if outlier_trimming_applied {
        &stable_runs
    } else {
        &sorted_runs
    };
    let considered: Vec<&Run> = considered.iter().map(|r| &dataset.runs[r.index]).collect();

    let metrics = metrics
        .iter()
        .map(|metric| MetricSummary {
            metric: metric.name.clone(),
            kind: metric.kind,
            values: SeriesValues::compute(
                metric,
                &considered,
                config.missed_score,
                config.with_state,
            ),
        })
        .collect();

    // Step 4: representatives
    let representatives =
        RepresentativeRuns::select(&sorted_runs).ok_or_else(|| AnalysisError::EmptyDataset {
            name: dataset.name.clone(),
        })?;

    tracing::info!(
        dataset = %dataset.name,
        runs = sorted_runs.len(),
        stable = stable_runs.len(),
        trimmed = outlier_trimming_applied,
        low_bound_ms,
        high_bound_ms,
        "summarized dataset"
    );

    Ok(DatasetSummary {
        dataset: dataset.name.clone(),
        run_count: dataset.runs.len(),
        failed_runs: dataset.failures.len(),
        sorted_runs,
        low_bound_ms,
        high_bound_ms,
        stable_runs,
        outlier_trimming_applied,
        metrics,
        representatives,
    })
}
