//! Exit codes for the trend-core CLI.
//!
//! Exit codes communicate the outcome without parsing output. They are a
//! stable contract for automation.
//!
//! Ranges:
//! - 0-9: operational outcomes
//! - 10-19: user/environment errors (fixable by the caller)
//! - 20-29: internal errors

use trend_common::{Error, ErrorCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Ranking produced at least one entry, or a non-ranking command succeeded.
    Clean = 0,

    /// Ranking ran but nothing qualified.
    NothingTrending = 1,

    /// Invalid arguments or malformed input events.
    ArgsError = 10,

    /// Configuration missing, unparsable or semantically invalid.
    ConfigError = 11,

    /// Reading input or writing output failed.
    IoError = 12,

    /// Internal error (bug).
    InternalError = 20,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 0-9.
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    /// Codes 10-19.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Stable name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::NothingTrending => "OK_NOTHING_TRENDING",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::IoError => "ERR_IO",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }

    /// Map a library error onto the exit code contract.
    pub fn for_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Ingest => ExitCode::ArgsError,
            ErrorCategory::Io => ExitCode::IoError,
            ErrorCategory::Scoring => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
