//! Event log parsing for timeline analysis
//!
//! Each line of an event log is one event:
//!
//! ```text
//! line      := name "," "timestamp:" integer ("," attribute)*
//! attribute := key ":" value
//! value     := integer | "0x" hex | '"' "[" item ("," item)* "]" '"' | '"' text '"' | text
//! ```
//!
//! Commas inside double quotes do not separate fields. Timestamps are
//! nanoseconds since an arbitrary epoch; the first event of a log defines
//! t = 0 for that log.
//!
//! ```text
//! frame_present,timestamp:1500000000,frame_time:16600000,started:1,trace_attr:
//! create_graphics_pipeline,timestamp:1510000000,hashes:"[0x2,0x3]",duration:4000000
//! ```

use crate::error::{AnalysisError, Result};
use crate::fps::MAX_RECORDING_NS;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

const TIMESTAMP_KEY: &str = "timestamp";

/// Errors produced while parsing an event log line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventParseError {
    #[error("line {line}: missing event name")]
    MissingEventName { line: usize },

    #[error("line {line}: missing timestamp attribute")]
    MissingTimestamp { line: usize },

    #[error("line {line}: invalid timestamp '{value}'")]
    InvalidTimestamp { line: usize, value: String },

    #[error("line {line}: timestamp {value} is too far from the first event")]
    TimestampOutOfRange { line: usize, value: i64 },

    #[error("line {line}: malformed attribute '{field}'")]
    MalformedAttribute { line: usize, field: String },

    #[error("line {line}: unterminated quote")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: read failed: {message}")]
    Read { line: usize, message: String },
}

/// Typed attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    Int(i64),
    Hex(u64),
    /// Quoted `[..]` list of integer or hex items
    List(Vec<AttrValue>),
    Text(String),
}

impl AttrValue {
    /// Integer view of scalar numeric values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Hex(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }
}

/// One parsed event line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub timestamp_ns: i64,
    pub attributes: Vec<(String, AttrValue)>,
}

impl Event {
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn int_attribute(&self, key: &str) -> Option<i64> {
        self.attribute(key).and_then(AttrValue::as_i64)
    }
}

/// Event with its time relative to the start of the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub elapsed_ns: i64,
    pub event: Event,
}

/// All events of one log, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    pub events: Vec<TimedEvent>,
    /// Latest elapsed time of any event
    pub duration_ns: i64,
}

impl EventLog {
    /// Events with the given name, in file order
    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TimedEvent> + 'a {
        self.events.iter().filter(move |e| e.event.name == name)
    }
}

/// Split a line on commas that are not inside double quotes
fn split_fields(line: &str, line_no: usize) -> std::result::Result<Vec<&str>, EventParseError> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(EventParseError::UnterminatedQuote { line: line_no });
    }
    fields.push(&line[start..]);
    Ok(fields)
}

fn parse_list_item(text: &str) -> Option<AttrValue> {
    match text.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok().map(AttrValue::Hex),
        None => text.parse().ok().map(AttrValue::Int),
    }
}

fn parse_value(raw: &str, field: &str, line_no: usize) -> std::result::Result<AttrValue, EventParseError> {
    let malformed = || EventParseError::MalformedAttribute {
        line: line_no,
        field: field.to_string(),
    };

    if let Some(quoted) = raw.strip_prefix('"') {
        let inner = quoted.strip_suffix('"').ok_or_else(malformed)?;
        return match inner.strip_prefix('[') {
            Some(list) => {
                let list = list.strip_suffix(']').ok_or_else(malformed)?;
                if list.trim().is_empty() {
                    return Ok(AttrValue::List(Vec::new()));
                }
                list.split(',')
                    .map(|item| parse_list_item(item.trim()).ok_or_else(malformed))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(AttrValue::List)
            }
            None => Ok(AttrValue::Text(inner.to_string())),
        };
    }

    if let Some(hex) = raw.strip_prefix("0x") {
        return u64::from_str_radix(hex, 16)
            .map(AttrValue::Hex)
            .map_err(|_| malformed());
    }

    Ok(raw
        .parse::<i64>()
        .map(AttrValue::Int)
        .unwrap_or_else(|_| AttrValue::Text(raw.to_string())))
}

/// Parse one event line; `line_no` labels errors
pub fn parse_event_line(line: &str, line_no: usize) -> std::result::Result<Event, EventParseError> {
    let fields = split_fields(line.trim_end_matches(['\r', '\n']), line_no)?;
    let mut fields = fields.into_iter();

    let name = fields.next().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(EventParseError::MissingEventName { line: line_no });
    }

    let timestamp_field = fields
        .next()
        .ok_or(EventParseError::MissingTimestamp { line: line_no })?;
    let raw_timestamp = match timestamp_field.split_once(':') {
        Some((key, value)) if key.trim() == TIMESTAMP_KEY => value.trim(),
        _ => return Err(EventParseError::MissingTimestamp { line: line_no }),
    };
    let timestamp_ns = raw_timestamp
        .parse::<i64>()
        .map_err(|_| EventParseError::InvalidTimestamp {
            line: line_no,
            value: raw_timestamp.to_string(),
        })?;

    let attributes = fields
        .map(|field| -> std::result::Result<(String, AttrValue), EventParseError> {
            let (key, value) = field
                .split_once(':')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| EventParseError::MalformedAttribute {
                    line: line_no,
                    field: field.to_string(),
                })?;
            Ok((key.trim().to_string(), parse_value(value.trim(), field, line_no)?))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Event {
        name: name.to_string(),
        timestamp_ns,
        attributes,
    })
}

/// Parse a whole event log; blank lines are skipped
pub fn parse_event_log<R: BufRead>(reader: R) -> std::result::Result<EventLog, EventParseError> {
    let mut log = EventLog::default();
    let mut start_ns: Option<i64> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| EventParseError::Read {
            line: line_no,
            message: e.to_string(),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let event = parse_event_line(&line, line_no)?;
        let start = *start_ns.get_or_insert(event.timestamp_ns);
        let elapsed_ns = event
            .timestamp_ns
            .checked_sub(start)
            .filter(|&t| t <= MAX_RECORDING_NS as i64)
            .ok_or(EventParseError::TimestampOutOfRange {
                line: line_no,
                value: event.timestamp_ns,
            })?;

        log.duration_ns = log.duration_ns.max(elapsed_ns);
        log.events.push(TimedEvent { elapsed_ns, event });
    }

    Ok(log)
}

/// Read and parse an event log file
pub fn read_event_log<P: AsRef<Path>>(path: P) -> Result<EventLog> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let log = parse_event_log(BufReader::new(file)).map_err(|source| AnalysisError::EventLog {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), events = log.events.len(), "parsed event log");
    Ok(log)
}
