//! Time spent in each execution state
//!
//! Computed over every frame of the run, before any narrowing of the
//! statistics to a single state.

use crate::frame_log::{FrameRecord, StateId};
use crate::percentiles::NANOS_PER_MILLI;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cumulative frame time per state, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDurations {
    durations_ms: BTreeMap<StateId, f64>,
}

impl StateDurations {
    /// Sum frame durations per state; untagged frames count as the default state
    pub fn from_frames(frames: &[FrameRecord]) -> Self {
        let mut totals_ns: BTreeMap<StateId, u64> = BTreeMap::new();
        for frame in frames {
            let entry = totals_ns.entry(frame.state_or_default()).or_default();
            *entry = entry.saturating_add(frame.duration_ns);
        }

        let durations_ms = totals_ns
            .into_iter()
            .map(|(state, ns)| (state, ns as f64 / NANOS_PER_MILLI))
            .collect();

        Self { durations_ms }
    }

    /// Milliseconds spent in `state`; 0 for a state never observed
    pub fn time_in_state(&self, state: StateId) -> f64 {
        self.durations_ms.get(&state).copied().unwrap_or(0.0)
    }

    /// States observed, in ascending order
    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.durations_ms.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, f64)> + '_ {
        self.durations_ms.iter().map(|(&s, &ms)| (s, ms))
    }

    pub fn total_ms(&self) -> f64 {
        self.durations_ms.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.durations_ms.is_empty()
    }
}
