//! JSONL event ingestion.
//!
//! One event per line:
//!
//! ```text
//! {"id": "rust", "timestamp": "2024-06-01T12:00:00Z"}
//! {"id": "go"}
//! ```
//!
//! A missing timestamp means "now" as given by the caller. Blank lines and
//! lines starting with `#` are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use trend_common::{Error, Result};

use crate::logging::{event_names, Stage};
use crate::scorer::Scorer;

/// A parsed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct RawEvent {
    id: String,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Parse one input line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<EventRecord>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let raw: RawEvent = serde_json::from_str(trimmed).map_err(|e| Error::MalformedEvent {
        line: line_no,
        message: e.to_string(),
    })?;
    if raw.id.is_empty() {
        return Err(Error::MalformedEvent {
            line: line_no,
            message: "empty id".to_string(),
        });
    }

    let timestamp = raw.timestamp.map(|ts| parse_timestamp(&ts)).transpose()?;
    Ok(Some(EventRecord {
        id: raw.id,
        timestamp,
    }))
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Ingestion behaviour.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Timestamp used for events that carry none.
    pub default_timestamp: DateTime<Utc>,
    /// Fail on the first bad line instead of skipping it.
    pub strict: bool,
}

/// Counters reported after ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Lines read, including blank and comment lines.
    pub lines: usize,
    /// Events recorded into the scorer.
    pub events: usize,
    /// Bad lines skipped.
    pub skipped: usize,
}

/// Feed every event from `reader` into `scorer`.
pub fn ingest<R: BufRead>(
    scorer: &Scorer,
    reader: R,
    options: &IngestOptions,
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        stats.lines += 1;

        match parse_line(&line, line_no) {
            Ok(Some(event)) => {
                let at = event.timestamp.unwrap_or(options.default_timestamp);
                scorer.add_event(&event.id, at);
                stats.events += 1;
            }
            Ok(None) => {}
            Err(err) if !options.strict => {
                tracing::warn!(
                    event = event_names::EVENT_SKIPPED,
                    stage = %Stage::Ingest,
                    line = line_no,
                    error = %err,
                    "skipping bad event line"
                );
                stats.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(
        event = event_names::EVENTS_INGESTED,
        stage = %Stage::Ingest,
        lines = stats.lines,
        events = stats.events,
        skipped = stats.skipped,
        items = scorer.len(),
        "events ingested"
    );
    Ok(stats)
}
