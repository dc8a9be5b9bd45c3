// Representative run selection
//
// Runs are ranked by median frame time. The low and high representatives sit
// at the 5th and 95th percentile rank, the median representative at the
// middle rank.

use serde::{Deserialize, Serialize};

/// Rank of percentile `p` among `n` sorted items: `round(p / 100 * (n - 1))`
pub fn rank_index(percentile: f64, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let rank = (percentile / 100.0 * (n - 1) as f64).round() as usize;
    rank.min(n - 1)
}

/// Reference to a run inside its dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRef {
    /// Index into the dataset's run list
    pub index: usize,
    pub name: String,
    pub median_ms: f64,
}

/// Runs picked for plotting and reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeRuns {
    pub low: RunRef,
    pub median: RunRef,
    pub high: RunRef,
}

impl RepresentativeRuns {
    /// Pick from runs already sorted by median
    ///
    /// Returns `None` for an empty list.
    pub fn select(sorted: &[RunRef]) -> Option<Self> {
        if sorted.is_empty() {
            return None;
        }
        let n = sorted.len();
        Some(Self {
            low: sorted[rank_index(5.0, n)].clone(),
            median: sorted[n / 2].clone(),
            high: sorted[rank_index(95.0, n)].clone(),
        })
    }
}
