//! Scoring configuration (scoring.json).
//!
//! Every field has a serde default, so a partial file only overrides what it
//! names. Durations are whole seconds.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::validate::ValidationError;

/// Immutable settings shared by the scorer and every item it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Time for the running peak score to decay to half.
    #[serde(default = "default_half_life_secs")]
    pub half_life_secs: u64,

    /// Window defining "current activity".
    #[serde(default = "default_recent_duration_secs")]
    pub recent_duration_secs: u64,

    /// Window defining the historical population, and the retention of the
    /// rolling maximum baseline.
    #[serde(default = "default_storage_duration_secs")]
    pub storage_duration_secs: u64,

    /// Maximum number of ranked entries returned.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Assumed events per recent window for an entity with no history.
    #[serde(default = "default_base_count")]
    pub base_count: f64,

    /// Blended scores below this are dropped from the ranking. Unset keeps
    /// everything, including negative scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,

    /// Minimum recent event count for an entity to be scored at all.
    #[serde(default)]
    pub count_threshold: f64,

    /// Bucket width of the rolling maximum baseline.
    #[serde(default = "default_bucket_step_secs")]
    pub bucket_step_secs: u64,

    /// Entities with no events for this long may be evicted on request.
    /// Unset disables eviction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_eviction_secs: Option<u64>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_half_life_secs() -> u64 {
    2 * 60 * 60
}

fn default_recent_duration_secs() -> u64 {
    60
}

fn default_storage_duration_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_max_results() -> usize {
    10
}

fn default_base_count() -> f64 {
    3.0
}

fn default_bucket_step_secs() -> u64 {
    24 * 60 * 60
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            half_life_secs: default_half_life_secs(),
            recent_duration_secs: default_recent_duration_secs(),
            storage_duration_secs: default_storage_duration_secs(),
            max_results: default_max_results(),
            base_count: default_base_count(),
            score_threshold: None,
            count_threshold: 0.0,
            bucket_step_secs: default_bucket_step_secs(),
            idle_eviction_secs: None,
        }
    }
}

impl ScoringConfig {
    /// Load scoring config from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_str(&content)
    }

    /// Parse scoring config from a JSON string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    pub fn half_life(&self) -> Duration {
        Duration::from_secs(self.half_life_secs)
    }

    pub fn recent_duration(&self) -> Duration {
        Duration::from_secs(self.recent_duration_secs)
    }

    pub fn storage_duration(&self) -> Duration {
        Duration::from_secs(self.storage_duration_secs)
    }

    pub fn bucket_step(&self) -> Duration {
        Duration::from_secs(self.bucket_step_secs)
    }

    pub fn idle_eviction(&self) -> Option<Duration> {
        self.idle_eviction_secs.map(Duration::from_secs)
    }

    /// Number of recent windows that fit in the storage window.
    pub fn windows_per_storage(&self) -> f64 {
        if self.recent_duration_secs == 0 {
            return 0.0;
        }
        self.storage_duration_secs as f64 / self.recent_duration_secs as f64
    }

    /// Historical count assumed for an entity seen for the first time:
    /// `base_count` events in every recent window across the storage window.
    pub fn default_history_count(&self) -> f64 {
        self.base_count * self.windows_per_storage()
    }

    /// Baseline probability used while an entity's rolling maximum is empty:
    /// the share of the storage window covered by one recent window.
    pub fn default_expectation(&self) -> f64 {
        if self.storage_duration_secs == 0 {
            return 0.0;
        }
        self.recent_duration_secs as f64 / self.storage_duration_secs as f64
    }

    /// Number of buckets in the rolling maximum window.
    pub fn bucket_count(&self) -> usize {
        if self.bucket_step_secs == 0 {
            return 0;
        }
        (self.storage_duration_secs / self.bucket_step_secs) as usize
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ValidationError::ParseError(format!("Failed to serialize: {}", e)))
    }
}
