//! Structured event vocabulary.
//!
//! Every tracing event carries an `event` field with one of the stable names
//! below so JSONL output can be filtered without parsing messages.

use serde::{Deserialize, Serialize};

/// Pipeline stage an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading events into the scorer.
    Ingest,
    /// Scoring and ranking.
    Rank,
    /// Rendering results.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Ingest => "ingest",
            Stage::Rank => "rank",
            Stage::Report => "report",
        };
        f.write_str(s)
    }
}

/// Standard event names.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";

    // Items
    pub const ITEM_CREATED: &str = "item.created";
    pub const ITEM_EVICTED: &str = "item.evicted";

    // Ingest
    pub const EVENTS_INGESTED: &str = "events.ingested";
    pub const EVENT_SKIPPED: &str = "events.skipped";

    // Scoring
    pub const COUNTER_QUERY_FAILED: &str = "counter.query_failed";
    pub const RANK_COMPLETED: &str = "rank.completed";

    // Report
    pub const REPORT_WRITTEN: &str = "report.written";

    pub const INTERNAL_ERROR: &str = "internal_error";
}
