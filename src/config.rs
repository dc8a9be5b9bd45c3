//! Analysis configuration
//!
//! One `AnalysisConfig` drives the whole pipeline: which log format the
//! parser expects, how each run is trimmed, which state the statistics are
//! narrowed to and how runs are combined across a dataset.
//!
//! # Example analysis.toml
//!
//! ```toml
//! target_fps = 60.0
//! with_state = true
//! drop_front_seconds = 5.0
//! duration_cap_seconds = 120.0
//! state_filter = 1
//! outlier_trimming = true
//! ```

use crate::error::{AnalysisError, Result};
use crate::frame_log::StateId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for frame-time analysis
///
/// # Example
/// ```
/// use framestat::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.target_fps, 60.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Target frame rate used for missed-frame metrics
    ///
    /// Fixed per configuration, never derived from the data.
    pub target_fps: f64,

    /// Expect a second `state` column in frame-time logs
    pub with_state: bool,

    /// Drop leading frames until this many seconds have elapsed
    pub drop_front_seconds: Option<f64>,

    /// Stop the run once this many seconds have elapsed
    pub duration_cap_seconds: Option<f64>,

    /// Restrict percentile statistics to frames tagged with this state
    ///
    /// State durations are still computed over every state.
    pub state_filter: Option<StateId>,

    /// Feed only the stable subset of runs to the cross-run aggregators
    ///
    /// The stable subset is computed either way; this decides whether it
    /// gates the aggregator inputs.
    pub outlier_trimming: bool,

    /// Report the missed-score series
    pub missed_score: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            with_state: false,
            drop_front_seconds: None,
            duration_cap_seconds: None,
            state_filter: None,
            outlier_trimming: true,
            missed_score: true,
        }
    }
}

impl AnalysisConfig {
    /// Configuration for two-column logs that carry a state per frame
    pub fn state_aware() -> Self {
        Self {
            with_state: true,
            ..Self::default()
        }
    }

    /// Target frame time in nanoseconds (`1e9 / target_fps`)
    pub fn target_frame_time_ns(&self) -> f64 {
        1e9 / self.target_fps
    }

    /// Load a configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|e| AnalysisError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.target_fps.is_finite() || self.target_fps <= 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "target_fps must be positive, got {}",
                self.target_fps
            )));
        }

        if let Some(seconds) = self.drop_front_seconds {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "drop_front_seconds must be non-negative, got {}",
                    seconds
                )));
            }
        }

        if let Some(seconds) = self.duration_cap_seconds {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "duration_cap_seconds must be positive, got {}",
                    seconds
                )));
            }
        }

        if self.state_filter.is_some() && !self.with_state {
            return Err(AnalysisError::InvalidConfig(
                "state_filter requires with_state".to_string(),
            ));
        }

        Ok(())
    }
}
