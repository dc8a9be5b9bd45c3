//! Frame-time log parsing and export
//!
//! A frame-time log is a delimited file whose first line is a header. Every
//! following row holds the frame duration in nanoseconds and, in the
//! two-column format, the state the frame was rendered in:
//!
//! ```text
//! frame_time_ns,state
//! 16612345,0
//! 16700002,1
//! ```
//!
//! Row order is presentation order. A row with the wrong field count, a
//! non-integer value, or a duration that takes the run past
//! `MAX_RECORDING_NS` aborts parsing of the whole file.

use crate::error::{AnalysisError, Result};
use crate::fps::MAX_RECORDING_NS;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Integer tag for the execution phase a frame belongs to
pub type StateId = i64;

/// State assumed for frames that carry no state tag
pub const DEFAULT_STATE: StateId = 0;

/// One presented frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Time it took to produce the frame, in nanoseconds
    pub duration_ns: u64,
    /// Execution state, when the log records one
    pub state: Option<StateId>,
}

impl FrameRecord {
    pub fn new(duration_ns: u64) -> Self {
        Self {
            duration_ns,
            state: None,
        }
    }

    pub fn with_state(duration_ns: u64, state: StateId) -> Self {
        Self {
            duration_ns,
            state: Some(state),
        }
    }

    /// State of this frame, with untagged frames in `DEFAULT_STATE`
    pub fn state_or_default(&self) -> StateId {
        self.state.unwrap_or(DEFAULT_STATE)
    }
}

/// Layout of a frame-time log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `duration_ns`
    SingleColumn,
    /// `duration_ns,state`
    WithState,
}

impl LogFormat {
    pub fn from_with_state(with_state: bool) -> Self {
        if with_state {
            Self::WithState
        } else {
            Self::SingleColumn
        }
    }

    /// Number of fields every data row must have
    pub fn field_count(self) -> usize {
        match self {
            Self::SingleColumn => 1,
            Self::WithState => 2,
        }
    }

    fn header(self) -> &'static [&'static str] {
        match self {
            Self::SingleColumn => &["frame_time_ns"],
            Self::WithState => &["frame_time_ns", "state"],
        }
    }
}

/// Parse a frame-time log file
pub fn parse_frame_log<P: AsRef<Path>>(path: P, format: LogFormat) -> Result<Vec<FrameRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let frames = parse_frame_log_reader(file, path, format)?;

    tracing::debug!(
        path = %path.display(),
        frames = frames.len(),
        "parsed frame-time log"
    );
    Ok(frames)
}

/// Parse frame-time records from any reader
///
/// `source` only labels errors.
pub fn parse_frame_log_reader<R: Read>(
    reader: R,
    source: &Path,
    format: LogFormat,
) -> Result<Vec<FrameRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let expected = format.field_count();
    let mut frames = Vec::new();
    let mut elapsed_ns: u64 = 0;

    for record in reader.records() {
        let record = record.map_err(|e| AnalysisError::csv(source, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let malformed = |reason: String| AnalysisError::MalformedRecord {
            path: source.to_path_buf(),
            line,
            reason,
        };

        if record.len() != expected {
            return Err(malformed(format!(
                "expected {} field(s), found {}",
                expected,
                record.len()
            )));
        }

        let duration_ns = record[0]
            .parse::<u64>()
            .map_err(|_| malformed(format!("invalid frame duration '{}'", &record[0])))?;

        elapsed_ns = elapsed_ns
            .checked_add(duration_ns)
            .filter(|&t| t <= MAX_RECORDING_NS)
            .ok_or_else(|| {
                malformed(format!(
                    "frame duration {} runs past {} hours of recording",
                    duration_ns,
                    MAX_RECORDING_NS / 3_600_000_000_000
                ))
            })?;

        let state = match format {
            LogFormat::SingleColumn => None,
            LogFormat::WithState => Some(
                record[1]
                    .parse::<StateId>()
                    .map_err(|_| malformed(format!("invalid state '{}'", &record[1])))?,
            ),
        };

        frames.push(FrameRecord { duration_ns, state });
    }

    Ok(frames)
}

/// Write frames to `dir/file_name` in the given log format
///
/// Produces a file `parse_frame_log` reads back unchanged; used to hand
/// trimmed runs to the external renderer.
pub fn export_frames(
    frames: &[FrameRecord],
    format: LogFormat,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))?;
    let path = dir.join(file_name);

    let mut writer = csv::Writer::from_path(&path).map_err(|e| AnalysisError::csv(&path, e))?;
    writer
        .write_record(format.header())
        .map_err(|e| AnalysisError::csv(&path, e))?;

    for frame in frames {
        let duration = frame.duration_ns.to_string();
        let written = match format {
            LogFormat::SingleColumn => writer.write_record([duration.as_str()]),
            LogFormat::WithState => {
                let state = frame.state_or_default().to_string();
                writer.write_record([duration.as_str(), state.as_str()])
            }
        };
        written.map_err(|e| AnalysisError::csv(&path, e))?;
    }

    writer.flush().map_err(|e| AnalysisError::io(&path, e))?;
    tracing::debug!(path = %path.display(), frames = frames.len(), "exported frames");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str, format: LogFormat) -> Result<Vec<FrameRecord>> {
        parse_frame_log_reader(content.as_bytes(), Path::new("test.log"), format)
    }

    #[test]
    fn test_parse_single_column() {
        let frames = parse("frame_time\n10000000\n20000000\n30000000\n", LogFormat::SingleColumn)
            .unwrap();
        assert_eq!(
            frames,
            vec![
                FrameRecord::new(10_000_000),
                FrameRecord::new(20_000_000),
                FrameRecord::new(30_000_000),
            ]
        );
    }

    #[test]
    fn test_parse_two_column() {
        let frames = parse(
            "frame_time,state\n10000000,0\n10000000,1\n10000000,0\n",
            LogFormat::WithState,
        )
        .unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1], FrameRecord::with_state(10_000_000, 1));
    }

    #[test]
    fn test_header_is_discarded() {
        // A numeric header is still a header
        let frames = parse("123\n456\n", LogFormat::SingleColumn).unwrap();
        assert_eq!(frames, vec![FrameRecord::new(456)]);
    }

    #[test]
    fn test_header_only_is_empty() {
        let frames = parse("frame_time\n", LogFormat::SingleColumn).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_wrong_field_count_is_malformed() {
        let result = parse("frame_time\n100\n200,1\n300\n", LogFormat::SingleColumn);
        match result {
            Err(AnalysisError::MalformedRecord { line, .. }) => assert_eq!(line, 3),
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_state_is_malformed() {
        let result = parse("frame_time,state\n100,0\n200\n", LogFormat::WithState);
        assert!(matches!(result, Err(AnalysisError::MalformedRecord { .. })));
    }

    #[test]
    fn test_non_integer_is_malformed() {
        let result = parse("frame_time\n100\n12.5\n", LogFormat::SingleColumn);
        assert!(matches!(result, Err(AnalysisError::MalformedRecord { .. })));

        let result = parse("frame_time\n-100\n", LogFormat::SingleColumn);
        assert!(matches!(result, Err(AnalysisError::MalformedRecord { .. })));

        let result = parse("frame_time,state\n100,loading\n", LogFormat::WithState);
        assert!(matches!(result, Err(AnalysisError::MalformedRecord { .. })));
    }

    #[test]
    fn test_unbounded_duration_is_malformed() {
        let result = parse("frame_time\n100\n18446744073709551615\n", LogFormat::SingleColumn);
        match result {
            Err(AnalysisError::MalformedRecord { line, reason, .. }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("18446744073709551615"), "{}", reason);
            }
            other => panic!("Expected MalformedRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_recording_length_is_bounded() {
        let half = MAX_RECORDING_NS / 2;
        let content = format!("frame_time\n{}\n{}\n", half, half);
        assert_eq!(parse(&content, LogFormat::SingleColumn).unwrap().len(), 2);

        let content = format!("frame_time\n{}\n{}\n1\n", half, half);
        assert!(matches!(
            parse(&content, LogFormat::SingleColumn),
            Err(AnalysisError::MalformedRecord { line: 4, .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = parse_frame_log("/nonexistent/frame_times.log", LogFormat::SingleColumn);
        assert!(matches!(result, Err(AnalysisError::Io { .. })));
    }

    #[test]
    fn test_state_or_default() {
        assert_eq!(FrameRecord::new(1).state_or_default(), DEFAULT_STATE);
        assert_eq!(FrameRecord::with_state(1, 3).state_or_default(), 3);
    }

    #[test]
    fn test_export_reads_back() {
        let dir = TempDir::new().unwrap();
        let frames = vec![
            FrameRecord::with_state(5, 0),
            FrameRecord::with_state(7, 2),
        ];

        let path = export_frames(&frames, LogFormat::WithState, dir.path(), "trimmed.log").unwrap();
        assert_eq!(path, dir.path().join("trimmed.log"));

        let parsed = parse_frame_log(&path, LogFormat::WithState).unwrap();
        assert_eq!(parsed, frames);
    }

    #[test]
    fn test_export_single_column() {
        let dir = TempDir::new().unwrap();
        let frames = vec![FrameRecord::new(11), FrameRecord::new(13)];

        let path =
            export_frames(&frames, LogFormat::SingleColumn, dir.path(), "run.log").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "frame_time_ns\n11\n13\n");
    }
}
