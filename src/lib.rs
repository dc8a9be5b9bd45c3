//! Framestat - frame-time statistics for graphics benchmark runs
//!
//! This library turns per-frame timing logs into percentile statistics,
//! per-state time accounting and per-second FPS series, and summarizes
//! repeated runs of one configuration into a noise-aware dataset report.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod error;
pub mod event_log;
pub mod fps;
pub mod frame_log;
pub mod json_output;
pub mod percentiles;
pub mod render;
pub mod report;
pub mod run;
pub mod state;
pub mod summary;
pub mod timeline;
pub mod window;

pub use error::{AnalysisError, Result};
