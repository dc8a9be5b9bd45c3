//! Timeline view of an event log
//!
//! Builds the per-second FPS series from `frame_present` events and the
//! pipeline creation series from `create_*_pipeline` events.

use crate::event_log::{EventLog, TimedEvent};
use crate::fps::{self, FpsBucket, StateSegment};
use crate::frame_log::{StateId, DEFAULT_STATE};
use crate::percentiles::NANOS_PER_MILLI;
use serde::{Deserialize, Serialize};

pub const FRAME_PRESENT: &str = "frame_present";
pub const CREATE_GRAPHICS_PIPELINE: &str = "create_graphics_pipeline";
pub const CREATE_COMPUTE_PIPELINE: &str = "create_compute_pipeline";

const NANOS_PER_SECOND: f64 = 1e9;

/// Pipeline type of a creation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    Graphics,
    Compute,
}

impl PipelineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Graphics => "graphics",
            Self::Compute => "compute",
        }
    }
}

/// One pipeline creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineCreation {
    /// Seconds since the start of the log
    pub seconds: f64,
    pub creation_ms: f64,
    pub kind: PipelineKind,
}

/// FPS and pipeline creation series of one event log
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub dataset: String,
    pub duration_seconds: f64,
    pub fps: Vec<FpsBucket>,
    pub pipelines: Vec<PipelineCreation>,
}

impl Timeline {
    pub fn from_event_log(dataset: impl Into<String>, log: &EventLog) -> Self {
        let timepoints: Vec<(u64, StateId)> = log
            .events_named(FRAME_PRESENT)
            .map(|e| (e.elapsed_ns.max(0) as u64, frame_state(e)))
            .collect();

        let mut pipelines: Vec<PipelineCreation> = log
            .events
            .iter()
            .filter_map(pipeline_creation)
            .collect();
        pipelines.sort_by(|a, b| a.seconds.total_cmp(&b.seconds));

        Self {
            dataset: dataset.into(),
            duration_seconds: log.duration_ns as f64 / NANOS_PER_SECOND,
            fps: fps::bucketize_timepoints(&timepoints),
            pipelines,
        }
    }

    /// FPS series split into same-state segments
    pub fn fps_segments(&self) -> Vec<StateSegment> {
        fps::split_by_state(&self.fps)
    }

    /// Slowest pipeline creation in milliseconds
    pub fn max_creation_ms(&self) -> f64 {
        self.pipelines
            .iter()
            .map(|p| p.creation_ms)
            .fold(0.0, f64::max)
    }
}

/// `state` attribute, else the `started` flag, else the default state
fn frame_state(event: &TimedEvent) -> StateId {
    event
        .event
        .int_attribute("state")
        .or_else(|| event.event.int_attribute("started"))
        .unwrap_or(DEFAULT_STATE)
}

fn pipeline_creation(event: &TimedEvent) -> Option<PipelineCreation> {
    let kind = match event.event.name.as_str() {
        CREATE_GRAPHICS_PIPELINE => PipelineKind::Graphics,
        CREATE_COMPUTE_PIPELINE => PipelineKind::Compute,
        _ => return None,
    };

    let Some(duration_ns) = event.event.int_attribute("duration") else {
        tracing::warn!(event = %event.event.name, "pipeline event without duration");
        return None;
    };

    Some(PipelineCreation {
        seconds: event.elapsed_ns as f64 / NANOS_PER_SECOND,
        creation_ms: duration_ns as f64 / NANOS_PER_MILLI,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::parse_event_log;

    const LOG: &str = "\
layer_init,timestamp:1000000000
frame_present,timestamp:1200000000,frame_time:16000000,started:0
frame_present,timestamp:1700000000,frame_time:16000000,started:0
create_graphics_pipeline,timestamp:1800000000,hashes:\"[0x2,0x3]\",duration:4000000
frame_present,timestamp:2100000000,frame_time:16000000,started:1
create_compute_pipeline,timestamp:2200000000,hashes:\"[0x4]\",duration:250000000
frame_present,timestamp:2300000000,frame_time:16000000,started:1
";

    fn timeline() -> Timeline {
        let log = parse_event_log(LOG.as_bytes()).unwrap();
        Timeline::from_event_log("A", &log)
    }

    #[test]
    fn test_fps_series() {
        let timeline = timeline();
        // Frames at 0.2, 0.7, 1.1, 1.3 s since the first event
        let counts: Vec<_> = timeline.fps.iter().map(|b| b.frame_count).collect();
        assert_eq!(counts, vec![2, 2]);
        assert_eq!(timeline.fps[0].representative_state, 0);
        assert_eq!(timeline.fps[1].representative_state, 1);
    }

    #[test]
    fn test_pipeline_series() {
        let timeline = timeline();
        assert_eq!(timeline.pipelines.len(), 2);
        assert_eq!(timeline.pipelines[0].kind, PipelineKind::Graphics);
        assert!((timeline.pipelines[0].seconds - 0.8).abs() < 1e-9);
        assert_eq!(timeline.pipelines[0].creation_ms, 4.0);
        assert_eq!(timeline.pipelines[1].kind, PipelineKind::Compute);
        assert_eq!(timeline.max_creation_ms(), 250.0);
    }

    #[test]
    fn test_duration() {
        assert!((timeline().duration_seconds - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_segments() {
        let segments = timeline().fps_segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].state, 1);
    }

    #[test]
    fn test_explicit_state_wins() {
        let log = parse_event_log(
            "frame_present,timestamp:0,state:3,started:1\n".as_bytes(),
        )
        .unwrap();
        let timeline = Timeline::from_event_log("B", &log);
        assert_eq!(timeline.fps[0].representative_state, 3);
    }

    #[test]
    fn test_log_without_frames() {
        let log = parse_event_log("layer_init,timestamp:5\n".as_bytes()).unwrap();
        let timeline = Timeline::from_event_log("C", &log);
        assert!(timeline.fps.is_empty());
        assert!(timeline.pipelines.is_empty());
        assert_eq!(timeline.max_creation_ms(), 0.0);
    }
}
