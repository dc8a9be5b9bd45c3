//! Per-second FPS series
//!
//! A frame belongs to the second in which it finished: bucket index is
//! `floor(timepoint_ns / 1e9)`. Each bucket counts its frames and records the
//! state of the last frame that landed in it.

use crate::frame_log::{FrameRecord, StateId, DEFAULT_STATE};
use serde::{Deserialize, Serialize};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Longest recording the log readers accept (24 hours)
///
/// Series are dense, one bucket per second, so the span of the input sets
/// their length.
pub const MAX_RECORDING_NS: u64 = 24 * 60 * 60 * NANOS_PER_SECOND;

/// Frames presented during one second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpsBucket {
    pub second_index: i64,
    pub frame_count: u64,
    /// State of the last frame in the bucket (`DEFAULT_STATE` when empty)
    pub representative_state: StateId,
}

/// Contiguous run of buckets sharing one state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSegment {
    pub state: StateId,
    pub seconds: Vec<i64>,
    pub fps: Vec<u64>,
}

/// Bucket a run's frames by cumulative presentation time
///
/// Produces `ceil(total / 1s) + 1` buckets starting at second 0, minus a
/// trailing empty bucket.
pub fn bucketize(frames: &[FrameRecord]) -> Vec<FpsBucket> {
    let mut elapsed_ns: u64 = 0;
    let timepoints: Vec<(u64, StateId)> = frames
        .iter()
        .map(|frame| {
            elapsed_ns = elapsed_ns.saturating_add(frame.duration_ns);
            (elapsed_ns, frame.state_or_default())
        })
        .collect();

    bucketize_from(&timepoints, 0)
}

/// Bucket frames given by absolute presentation timepoints
///
/// The series starts at the second of the earliest timepoint.
pub fn bucketize_timepoints(timepoints: &[(u64, StateId)]) -> Vec<FpsBucket> {
    let Some(first_ns) = timepoints.iter().map(|&(t, _)| t).min() else {
        return Vec::new();
    };
    bucketize_from(timepoints, first_ns / NANOS_PER_SECOND)
}

fn bucketize_from(timepoints: &[(u64, StateId)], first_second: u64) -> Vec<FpsBucket> {
    let Some(last_ns) = timepoints.iter().map(|&(t, _)| t).max() else {
        return Vec::new();
    };

    let last_second = last_ns.div_ceil(NANOS_PER_SECOND);
    let bucket_count = (last_second - first_second + 1) as usize;

    let mut buckets: Vec<FpsBucket> = (0..bucket_count)
        .map(|i| FpsBucket {
            second_index: (first_second + i as u64) as i64,
            frame_count: 0,
            representative_state: DEFAULT_STATE,
        })
        .collect();

    for &(timepoint, state) in timepoints {
        let idx = (timepoint / NANOS_PER_SECOND - first_second) as usize;
        let bucket = &mut buckets[idx];
        bucket.frame_count += 1;
        bucket.representative_state = state;
    }

    if buckets.last().is_some_and(|b| b.frame_count == 0) {
        buckets.pop();
    }

    buckets
}

/// Split an FPS series into contiguous same-state segments
pub fn split_by_state(buckets: &[FpsBucket]) -> Vec<StateSegment> {
    let mut segments: Vec<StateSegment> = Vec::new();

    for bucket in buckets {
        match segments.last_mut() {
            Some(segment) if segment.state == bucket.representative_state => {
                segment.seconds.push(bucket.second_index);
                segment.fps.push(bucket.frame_count);
            }
            _ => segments.push(StateSegment {
                state: bucket.representative_state,
                seconds: vec![bucket.second_index],
                fps: vec![bucket.frame_count],
            }),
        }
    }

    segments
}
