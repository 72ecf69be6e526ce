//! JSON Schema generation for configuration and report types.
//!
//! ```bash
//! trend-core schema --list
//! trend-core schema RankingReport
//! trend-core schema --all
//! ```

use schemars::schema_for;
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::config::ConfigSnapshot;
pub use crate::output::{IngestSummary, RankedEntry, RankingReport};
pub use trend_config::ScoringConfig;

/// Schema-bearing types with one-line descriptions.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ScoringConfig", "Scoring configuration file (scoring.json)"),
        ("ConfigSnapshot", "Provenance of the configuration used"),
        ("RankedEntry", "Single ranked item"),
        ("IngestSummary", "Counters from event ingestion"),
        ("RankingReport", "Complete output of the rank command"),
    ]
}

/// Schema for a type by name; `None` if the name is unknown.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let schema = match type_name {
        "ScoringConfig" => schema_for!(ScoringConfig),
        "ConfigSnapshot" => schema_for!(ConfigSnapshot),
        "RankedEntry" => schema_for!(RankedEntry),
        "IngestSummary" => schema_for!(IngestSummary),
        "RankingReport" => schema_for!(RankingReport),
        _ => return None,
    };
    serde_json::to_value(schema).ok()
}

/// Every schema keyed by type name.
pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    available_schemas()
        .into_iter()
        .filter_map(|(name, _)| generate_schema(name).map(|s| (name.to_string(), s)))
        .collect()
}
