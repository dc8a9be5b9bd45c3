//! Elapsed-time trimming of frame sequences
//!
//! Both operations walk the cumulative frame time from the start of the run
//! and return a new sequence. Each `FrameRecord` carries its own state, so
//! durations and states stay index-aligned through every trim.

use crate::frame_log::FrameRecord;

const NANOS_PER_SECOND: f64 = 1e9;

/// Drop leading frames until `seconds` have elapsed
///
/// The frame whose cumulative time first reaches the threshold is kept,
/// along with everything after it. `None` and `Some(0.0)` return the input
/// unchanged. If the threshold is never reached the result is empty.
pub fn drop_front(frames: &[FrameRecord], seconds: Option<f64>) -> Vec<FrameRecord> {
    let Some(seconds) = seconds.filter(|s| *s > 0.0) else {
        return frames.to_vec();
    };
    let threshold_ns = seconds * NANOS_PER_SECOND;

    let mut elapsed_ns: u64 = 0;
    for (i, frame) in frames.iter().enumerate() {
        elapsed_ns = elapsed_ns.saturating_add(frame.duration_ns);
        if elapsed_ns as f64 >= threshold_ns {
            tracing::trace!(dropped = i, kept = frames.len() - i, "drop-front");
            return frames[i..].to_vec();
        }
    }

    tracing::debug!(seconds, "drop-front threshold never reached");
    Vec::new()
}

/// Keep frames up to and including the one whose cumulative time first
/// exceeds `seconds`; `None` returns the input unchanged
pub fn cap_duration(frames: &[FrameRecord], seconds: Option<f64>) -> Vec<FrameRecord> {
    let Some(seconds) = seconds else {
        return frames.to_vec();
    };
    let cap_ns = seconds * NANOS_PER_SECOND;

    let mut elapsed_ns: u64 = 0;
    for (i, frame) in frames.iter().enumerate() {
        elapsed_ns = elapsed_ns.saturating_add(frame.duration_ns);
        if elapsed_ns as f64 > cap_ns {
            tracing::trace!(kept = i + 1, discarded = frames.len() - i - 1, "duration cap");
            return frames[..=i].to_vec();
        }
    }

    frames.to_vec()
}

/// Apply drop-front, then the duration cap measured from the new start
pub fn apply_window(
    frames: &[FrameRecord],
    drop_front_seconds: Option<f64>,
    duration_cap_seconds: Option<f64>,
) -> Vec<FrameRecord> {
    let dropped = drop_front(frames, drop_front_seconds);
    cap_duration(&dropped, duration_cap_seconds)
}
