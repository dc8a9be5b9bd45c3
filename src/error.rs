//! Error types for frame-time analysis

use std::path::PathBuf;
use thiserror::Error;

use crate::event_log::EventParseError;

/// Errors that can occur while loading or analyzing frame-time data
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed record in {path} at line {line}: {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Run {name} has no frames")]
    EmptyRun { name: String },

    #[error("Dataset {name} has no runs")]
    EmptyDataset { name: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Event log {path}: {source}")]
    EventLog {
        path: PathBuf,
        #[source]
        source: EventParseError,
    },

    #[error("Renderer failed: {0}")]
    Render(String),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
