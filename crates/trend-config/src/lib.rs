//! Trend scoring configuration loading and validation.
//!
//! This crate provides:
//! - A typed Rust struct for scoring.json
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation
//! - Named presets for common event cadences

pub mod preset;
pub mod resolve;
pub mod scoring;
pub mod validate;

pub use preset::{get_preset, list_presets, PresetInfo, PresetName};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use scoring::ScoringConfig;
pub use validate::{
    validate_scoring, ValidationError, ValidationResult, MAX_BUCKET_COUNT, MAX_STORAGE_DURATION_SECS,
};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
