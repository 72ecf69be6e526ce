//! Error types for trend scoring.
//!
//! Errors carry a stable numeric code, a category, and a remediation hint so
//! the CLI can render them for humans or serialize them for automation:
//! ```json
//! {
//!   "code": 20,
//!   "category": "ingest",
//!   "message": "malformed event on line 4: missing field `id`",
//!   "recoverable": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for trend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Scoring configuration errors.
    Config,
    /// Event stream parsing errors.
    Ingest,
    /// Scorer construction failures a validated config should never cause.
    Scoring,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Ingest => write!(f, "ingest"),
            ErrorCategory::Scoring => write!(f, "scoring"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for trend scoring.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid scoring configuration: {0}")]
    InvalidScoring(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    // Ingest errors (20-29)
    #[error("malformed event on line {line}: {message}")]
    MalformedEvent { line: usize, message: String },

    #[error("invalid timestamp {value:?}: {message}")]
    InvalidTimestamp { value: String, message: String },

    // Scoring errors (30-39)
    #[error("scoring failed: {0}")]
    Scoring(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Ingest errors
    /// - 30-39: Scoring errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidScoring(_) => 11,
            Error::UnknownPreset(_) => 12,
            Error::MalformedEvent { .. } => 20,
            Error::InvalidTimestamp { .. } => 21,
            Error::Scoring(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidScoring(_) | Error::UnknownPreset(_) => {
                ErrorCategory::Config
            }
            Error::MalformedEvent { .. } | Error::InvalidTimestamp { .. } => ErrorCategory::Ingest,
            Error::Scoring(_) => ErrorCategory::Scoring,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidScoring(_) | Error::UnknownPreset(_) => true,
            // A bad line can be fixed and the stream replayed
            Error::MalformedEvent { .. } | Error::InvalidTimestamp { .. } => true,
            Error::Scoring(_) => false,
            Error::Io(_) | Error::Json(_) => true,
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidScoring(_) => "Invalid Scoring Configuration",
            Error::UnknownPreset(_) => "Unknown Preset",
            Error::MalformedEvent { .. } => "Malformed Event",
            Error::InvalidTimestamp { .. } => "Invalid Timestamp",
            Error::Scoring(_) => "Scoring Error",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::InvalidScoring(_) => {
                "Run 'trend-core config validate' to check scoring.json, or fall back to a preset."
            }
            Error::UnknownPreset(_) => "List available presets with 'trend-core config presets'.",
            Error::MalformedEvent { .. } => {
                "Each line must be a JSON object like {\"id\": \"item\", \"timestamp\": \"2024-01-01T00:00:00Z\"}."
            }
            Error::InvalidTimestamp { .. } => "Timestamps must be RFC 3339, e.g. 2024-01-01T12:00:00Z.",
            Error::Scoring(_) => "Internal scoring issue. Report it with the input that triggered it.",
            Error::Io(_) => "Check that the file exists and is readable, then retry.",
            Error::Json(_) => "Invalid JSON. Check syntax with 'jq . <file>'.",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., line number).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::MalformedEvent { line, .. } => {
                context.insert("line".to_string(), serde_json::json!(line));
            }
            Error::InvalidTimestamp { value, .. } => {
                context.insert("timestamp".to_string(), serde_json::json!(value));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        headline = err.headline(),
        message = err,
        remediation = err.remediation(),
    )
}
