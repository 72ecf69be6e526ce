//! Configuration loading for trend-core.
//!
//! This module handles:
//! - Resolving scoring.json (CLI > env > XDG > system > defaults)
//! - Applying a named preset when no file is given explicitly
//! - Semantic validation via trend-config
//! - A config snapshot with provenance for reports

pub use trend_config::preset::{get_preset, list_presets, PresetInfo, PresetName};
pub use trend_config::{ConfigSource, ScoringConfig, ValidationError};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use trend_config::{resolve_config, validate_scoring};

use crate::logging::event_names;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown preset '{0}' (expected one of: standard, realtime, daily)")]
    UnknownPreset(String),

    #[error("semantic validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl From<ConfigError> for trend_common::Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownPreset(name) => trend_common::Error::UnknownPreset(name),
            ConfigError::Validation(e) => trend_common::Error::InvalidScoring(e.to_string()),
            other => trend_common::Error::Config(other.to_string()),
        }
    }
}

/// Configuration resolution options.
#[derive(Debug, Default, Clone)]
pub struct ConfigOptions {
    /// Explicit scoring.json path; must exist when given.
    pub config_path: Option<PathBuf>,
    /// Preset name, used when no explicit path is given.
    pub preset: Option<String>,
}

/// Loaded configuration with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub scoring: ScoringConfig,
    /// File the config came from (None for presets and defaults).
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
    /// Preset applied, if any.
    pub preset: Option<PresetName>,
    /// SHA-256 of the file content (None when no file was read).
    pub hash: Option<String>,
}

impl ResolvedConfig {
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            path: self.path.clone(),
            source: self.source.to_string(),
            preset: self.preset.map(|p| p.as_str().to_string()),
            hash: self.hash.clone(),
            schema_version: self.scoring.schema_version.clone(),
        }
    }
}

/// Provenance summary embedded in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub schema_version: String,
}

/// Load the scoring configuration.
///
/// Resolution order (highest to lowest priority):
/// 1. Explicit path in `options` (missing file is an error)
/// 2. Preset in `options`
/// 3. `TREND_CONFIG`, then `TREND_CONFIG_DIR/scoring.json`
/// 4. XDG config home, then `/etc/trend`
/// 5. Built-in defaults
pub fn load_config(options: &ConfigOptions) -> Result<ResolvedConfig, ConfigError> {
    let resolved = if let Some(path) = &options.config_path {
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
        let (scoring, hash) = load_scoring_file(path)?;
        ResolvedConfig {
            scoring,
            path: Some(path.clone()),
            source: ConfigSource::CliArgument,
            preset: None,
            hash: Some(hash),
        }
    } else if let Some(name) = &options.preset {
        let preset =
            PresetName::parse(name).ok_or_else(|| ConfigError::UnknownPreset(name.clone()))?;
        ResolvedConfig {
            scoring: get_preset(preset),
            path: None,
            source: ConfigSource::Preset,
            preset: Some(preset),
            hash: None,
        }
    } else {
        let paths = resolve_config(None);
        match paths.scoring {
            Some(path) => {
                let (scoring, hash) = load_scoring_file(&path)?;
                ResolvedConfig {
                    scoring,
                    path: Some(path),
                    source: paths.scoring_source,
                    preset: None,
                    hash: Some(hash),
                }
            }
            None => {
                tracing::debug!(
                    event = event_names::CONFIG_DEFAULT_USED,
                    "no scoring.json found; using built-in defaults"
                );
                ResolvedConfig {
                    scoring: ScoringConfig::default(),
                    path: None,
                    source: ConfigSource::BuiltinDefault,
                    preset: None,
                    hash: None,
                }
            }
        }
    };

    validate_scoring(&resolved.scoring)?;
    tracing::info!(
        event = event_names::CONFIG_LOADED,
        source = %resolved.source,
        path = ?resolved.path,
        "scoring config loaded"
    );
    Ok(resolved)
}

fn load_scoring_file(path: &Path) -> Result<(ScoringConfig, String), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let hash = compute_hash(&content);
    let scoring = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((scoring, hash))
}

/// SHA-256 of `content`, hex encoded.
pub fn compute_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
