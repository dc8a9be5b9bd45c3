//! Percentile distributions and missed-frame metrics for a single run
//!
//! Percentiles use linear interpolation between closest ranks: for
//! percentile `p` over `n` sorted values the rank is `p / 100 * (n - 1)` and
//! the value is interpolated between the two order statistics around it.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

pub const NANOS_PER_MILLI: f64 = 1e6;

/// Number of entries in a percentile table (p = 0..99)
pub const PERCENTILE_COUNT: usize = 100;

/// Interpolated percentile of already-sorted values
///
/// Returns `None` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], percentile: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let rank = (percentile / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (rank.ceil() as usize).min(n - 1);

            if lower == upper {
                Some(sorted[lower])
            } else {
                let weight = rank - lower as f64;
                let low = sorted[lower];
                let high = sorted[upper];
                // Rounding must not step outside the bracketing ranks
                Some((low + (high - low) * weight).clamp(low, high))
            }
        }
    }
}

/// Interpolated percentile of unsorted values
pub fn percentile(values: &[f64], percentile: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, percentile)
}

/// Frame-time percentiles in milliseconds, index = percentile 0..99
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileTable {
    values: Vec<f64>,
}

impl PercentileTable {
    /// Build the full table from frame durations in nanoseconds
    pub fn from_durations(durations_ns: &[u64]) -> Option<Self> {
        let mut sorted: Vec<f64> = durations_ns.iter().map(|&d| d as f64).collect();
        sorted.sort_by(f64::total_cmp);

        let values = (0..PERCENTILE_COUNT)
            .map(|p| percentile_sorted(&sorted, p as f64).map(|ns| ns / NANOS_PER_MILLI))
            .collect::<Option<Vec<_>>>()?;

        Some(Self { values })
    }

    /// The p-th percentile in milliseconds
    ///
    /// # Panics
    ///
    /// Panics if `p >= 100`.
    pub fn get(&self, p: usize) -> f64 {
        self.values[p]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn median(&self) -> f64 {
        self.get(50)
    }

    pub fn p90(&self) -> f64 {
        self.get(90)
    }

    pub fn p95(&self) -> f64 {
        self.get(95)
    }
}

/// Percentage of frames slower than the target frame time
pub fn percent_missed(durations_ns: &[u64], target_ns: f64) -> f64 {
    if durations_ns.is_empty() {
        return 0.0;
    }
    let missed = durations_ns
        .iter()
        .filter(|&&d| d as f64 > target_ns)
        .count();
    missed as f64 / durations_ns.len() as f64 * 100.0
}

/// Mean squared overage in ns², frames within target contribute 0
///
/// A 20ms frame against a 16ms target scores `(4ms)²`. The result is large
/// and is reported in exponential notation.
pub fn missed_score(durations_ns: &[u64], target_ns: f64) -> f64 {
    if durations_ns.is_empty() {
        return 0.0;
    }
    let total: f64 = durations_ns
        .iter()
        .map(|&d| {
            let over = d as f64 - target_ns;
            if over > 0.0 {
                over * over
            } else {
                0.0
            }
        })
        .sum();
    total / durations_ns.len() as f64
}

/// Per-run frame-time statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub percentiles: PercentileTable,
    pub total_duration_ms: f64,
    pub average_duration_ms: f64,
    pub missed_frames_percent: f64,
    pub missed_score: f64,
}

impl FrameStats {
    /// Compute statistics for a run; fails on an empty run
    pub fn compute(name: &str, durations_ns: &[u64], target_ns: f64) -> Result<Self> {
        let percentiles =
            PercentileTable::from_durations(durations_ns).ok_or_else(|| AnalysisError::EmptyRun {
                name: name.to_string(),
            })?;

        let total_ns: f64 = durations_ns.iter().map(|&d| d as f64).sum();

        Ok(Self {
            percentiles,
            total_duration_ms: total_ns / NANOS_PER_MILLI,
            average_duration_ms: total_ns / durations_ns.len() as f64 / NANOS_PER_MILLI,
            missed_frames_percent: percent_missed(durations_ns, target_ns),
            missed_score: missed_score(durations_ns, target_ns),
        })
    }

    pub fn median(&self) -> f64 {
        self.percentiles.median()
    }
}
