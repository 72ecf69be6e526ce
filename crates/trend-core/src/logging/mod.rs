//! Structured logging for trend-core.
//!
//! Two output modes, both on stderr:
//! - Human-readable lines for interactive use
//! - JSONL for pipelines and agents
//!
//! stdout is reserved for command payloads (rankings, config dumps).
//!
//! ```ignore
//! use trend_core::logging::{init_logging, LogConfig, event_names, Stage};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! tracing::info!(event = event_names::RUN_STARTED, stage = %Stage::Init, "starting");
//! ```

pub mod config;
pub mod events;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Stage};

use std::io::IsTerminal;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` directives, when present and valid, replace the level from
/// `config`. A second call is a no-op.
pub fn init_logging(config: &LogConfig) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            EnvFilter::default().add_directive(LevelFilter::from(config.level).into())
        });

    let result = match config.format {
        LogFormat::Human => {
            let builder = fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                builder.try_init()
            } else {
                builder.without_time().try_init()
            }
        }
        LogFormat::Jsonl => fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .flatten_event(true)
            .try_init(),
    };
    // Already installed (tests, embedding hosts).
    let _ = result;
}

/// Initialize logging from the environment only.
pub fn init_default_logging() {
    init_logging(&LogConfig::from_env(None, None));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.format, LogFormat::Human);
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.timestamps);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(&LogConfig::default().with_level(LogLevel::Off));
        init_default_logging();
        tracing::info!(event = event_names::RUN_STARTED, "after init");
    }
}
