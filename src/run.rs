//! Analyzed benchmark runs and datasets
//!
//! A `Run` is one frame-time log pushed through the whole per-run pipeline:
//! parse, trim, account state time, narrow to the analyzed state and compute
//! the percentile statistics. A `Dataset` groups the runs of one
//! configuration for cross-run summaries.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::fps::{self, FpsBucket};
use crate::frame_log::{self, FrameRecord, LogFormat, StateId};
use crate::percentiles::{FrameStats, PercentileTable};
use crate::state::StateDurations;
use crate::window;
use std::path::{Path, PathBuf};

/// One analyzed benchmark execution
#[derive(Debug, Clone)]
pub struct Run {
    name: String,
    source_path: PathBuf,
    format: LogFormat,
    /// Frames inside the time window, every state included
    frames: Vec<FrameRecord>,
    /// Frames the statistics were computed from
    analyzed_frames: usize,
    trimmed: bool,
    stats: FrameStats,
    state_durations: StateDurations,
}

impl Run {
    /// Parse and analyze one frame-time log
    pub fn from_file<P: AsRef<Path>>(path: P, config: &AnalysisConfig) -> Result<Self> {
        let path = path.as_ref();
        let format = LogFormat::from_with_state(config.with_state);
        let frames = frame_log::parse_frame_log(path, format)?;

        let full_path = path
            .canonicalize()
            .map_err(|e| AnalysisError::io(path, e))?;
        let name = run_name(&full_path);

        Self::from_frames(name, full_path, frames, config)
    }

    /// Analyze an already parsed frame sequence
    pub fn from_frames(
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        frames: Vec<FrameRecord>,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        let name = name.into();
        let parsed = frames.len();

        let frames = window::apply_window(
            &frames,
            config.drop_front_seconds,
            config.duration_cap_seconds,
        );
        let trimmed = frames.len() != parsed;

        let state_durations = StateDurations::from_frames(&frames);

        let durations: Vec<u64> = frames
            .iter()
            .filter(|f| match config.state_filter {
                Some(state) => f.state_or_default() == state,
                None => true,
            })
            .map(|f| f.duration_ns)
            .collect();

        let stats = FrameStats::compute(&name, &durations, config.target_frame_time_ns())?;

        tracing::debug!(
            run = %name,
            parsed,
            windowed = frames.len(),
            analyzed = durations.len(),
            median_ms = stats.median(),
            "analyzed run"
        );

        Ok(Self {
            name,
            source_path: source_path.into(),
            format: LogFormat::from_with_state(config.with_state),
            frames,
            analyzed_frames: durations.len(),
            trimmed,
            stats,
            state_durations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Frames inside the analysis window
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Number of frames the statistics cover
    pub fn analyzed_frame_count(&self) -> usize {
        self.analyzed_frames
    }

    /// Whether the time window removed frames from the parsed log
    pub fn is_trimmed(&self) -> bool {
        self.trimmed
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn percentiles(&self) -> &PercentileTable {
        &self.stats.percentiles
    }

    pub fn median(&self) -> f64 {
        self.stats.percentiles.median()
    }

    pub fn p90(&self) -> f64 {
        self.stats.percentiles.p90()
    }

    pub fn p95(&self) -> f64 {
        self.stats.percentiles.p95()
    }

    pub fn average_duration_ms(&self) -> f64 {
        self.stats.average_duration_ms
    }

    pub fn total_duration_ms(&self) -> f64 {
        self.stats.total_duration_ms
    }

    pub fn missed_frames_percent(&self) -> f64 {
        self.stats.missed_frames_percent
    }

    pub fn missed_score(&self) -> f64 {
        self.stats.missed_score
    }

    pub fn state_durations(&self) -> &StateDurations {
        &self.state_durations
    }

    pub fn time_in_state(&self, state: StateId) -> f64 {
        self.state_durations.time_in_state(state)
    }

    /// Per-second FPS series over the analysis window
    pub fn fps_buckets(&self) -> Vec<FpsBucket> {
        fps::bucketize(&self.frames)
    }

    /// Path the renderer should read for this run
    ///
    /// Untrimmed runs point at their source log. Trimmed runs are exported to
    /// `dir` first as `<prefix>_<index>_<name>`. `index` is the run's position
    /// in its dataset, so runs with the same name never share a file.
    pub fn result_path(&self, dir: &Path, prefix: &str, index: usize) -> Result<PathBuf> {
        if !self.trimmed {
            return Ok(self.source_path.clone());
        }
        let file_name = format!("{}_{}_{}", prefix, index, self.name.replace(['/', '\\'], "_"));
        frame_log::export_frames(&self.frames, self.format, dir, &file_name)
    }
}

/// `<parent dir>/<file name>` of a log path
pub fn run_name(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path
        .parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/{}", parent, base)
}

/// A log that could not be turned into a run
#[derive(Debug)]
pub struct RunFailure {
    pub path: PathBuf,
    pub error: AnalysisError,
}

/// Runs of one benchmark configuration
#[derive(Debug)]
pub struct Dataset {
    pub name: String,
    pub runs: Vec<Run>,
    pub failures: Vec<RunFailure>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, runs: Vec<Run>) -> Self {
        Self {
            name: name.into(),
            runs,
            failures: Vec::new(),
        }
    }

    /// Load every log of a dataset
    ///
    /// A log that fails to parse or analyze is recorded in `failures` and
    /// does not stop the others from loading.
    pub fn load<P: AsRef<Path>>(name: impl Into<String>, paths: &[P], config: &AnalysisConfig) -> Self {
        let name = name.into();
        let mut runs = Vec::new();
        let mut failures = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match Run::from_file(path, config) {
                Ok(run) => runs.push(run),
                Err(error) => {
                    tracing::warn!(
                        dataset = %name,
                        path = %path.display(),
                        %error,
                        "skipping run"
                    );
                    failures.push(RunFailure {
                        path: path.to_path_buf(),
                        error,
                    });
                }
            }
        }

        tracing::debug!(dataset = %name, runs = runs.len(), failures = failures.len(), "loaded dataset");
        Self {
            name,
            runs,
            failures,
        }
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
