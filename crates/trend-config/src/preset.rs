//! Configuration presets for common event cadences.
//!
//! - Standard: minute-scale bursts against a week of history
//! - Realtime: second-scale bursts against the last hour
//! - Daily: hour-scale bursts against a month of history

use crate::scoring::ScoringConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// One-minute recent window, one-week history, two-hour half-life
    Standard,
    /// Ten-second recent window, one-hour history, fifteen-minute half-life
    Realtime,
    /// One-hour recent window, thirty-day history, one-day half-life
    Daily,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[
        PresetName::Standard,
        PresetName::Realtime,
        PresetName::Daily,
    ];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Standard => "standard",
            PresetName::Realtime => "realtime",
            PresetName::Daily => "daily",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "standard" | "default" | "std" => Some(PresetName::Standard),
            "realtime" | "live" | "fast" => Some(PresetName::Realtime),
            "daily" | "slow" => Some(PresetName::Daily),
            _ => None,
        }
    }

    /// Short description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Standard => "Minute-scale bursts against a week of history",
            PresetName::Realtime => "Second-scale bursts against the last hour",
            PresetName::Daily => "Hour-scale bursts against a month of history",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary of a preset for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: PresetName,
    pub description: String,
    pub config: ScoringConfig,
}

/// Build the scoring config for a preset.
pub fn get_preset(name: PresetName) -> ScoringConfig {
    match name {
        PresetName::Standard => ScoringConfig::default(),
        PresetName::Realtime => ScoringConfig {
            half_life_secs: 15 * 60,
            recent_duration_secs: 10,
            storage_duration_secs: 60 * 60,
            max_results: 20,
            base_count: 1.0,
            bucket_step_secs: 5 * 60,
            idle_eviction_secs: Some(2 * 60 * 60),
            ..ScoringConfig::default()
        },
        PresetName::Daily => ScoringConfig {
            half_life_secs: 24 * 60 * 60,
            recent_duration_secs: 60 * 60,
            storage_duration_secs: 30 * 24 * 60 * 60,
            base_count: 5.0,
            count_threshold: 2.0,
            bucket_step_secs: 24 * 60 * 60,
            ..ScoringConfig::default()
        },
    }
}

/// List all presets with their configs.
pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .iter()
        .map(|&name| PresetInfo {
            name,
            description: name.description().to_string(),
            config: get_preset(name),
        })
        .collect()
}
