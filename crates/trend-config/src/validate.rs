//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::scoring::ScoringConfig;

/// Longest accepted `storage_duration_secs` (one leap year).
pub const MAX_STORAGE_DURATION_SECS: u64 = 366 * 24 * 60 * 60;

/// Most baseline buckets one item may hold (a week at minute resolution).
pub const MAX_BUCKET_COUNT: usize = 7 * 24 * 60;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate scoring configuration semantically.
///
/// A config that passes keeps every scoring computation finite: positive
/// durations, a positive base count and a bucket step that divides the
/// storage window.
pub fn validate_scoring(cfg: &ScoringConfig) -> ValidationResult<()> {
    if cfg.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: cfg.schema_version.clone(),
        });
    }

    if cfg.half_life_secs == 0 {
        return Err(invalid("half_life_secs", "Must be positive"));
    }
    if cfg.recent_duration_secs == 0 {
        return Err(invalid("recent_duration_secs", "Must be positive"));
    }
    if cfg.storage_duration_secs < cfg.recent_duration_secs {
        return Err(ValidationError::SemanticError(format!(
            "storage_duration_secs ({}) must be at least recent_duration_secs ({})",
            cfg.storage_duration_secs, cfg.recent_duration_secs
        )));
    }
    if cfg.max_results == 0 {
        return Err(invalid("max_results", "Must be at least 1"));
    }
    if !cfg.base_count.is_finite() || cfg.base_count <= 0.0 {
        return Err(invalid(
            "base_count",
            format!("Must be finite and positive, got {}", cfg.base_count),
        ));
    }
    if !cfg.count_threshold.is_finite() || cfg.count_threshold < 0.0 {
        return Err(invalid(
            "count_threshold",
            format!("Must be finite and >= 0, got {}", cfg.count_threshold),
        ));
    }
    if let Some(threshold) = cfg.score_threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(invalid(
                "score_threshold",
                format!("Must be finite and >= 0, got {}", threshold),
            ));
        }
    }

    validate_buckets(cfg)?;

    if cfg.idle_eviction_secs == Some(0) {
        return Err(invalid("idle_eviction_secs", "Must be positive when set"));
    }

    Ok(())
}

fn validate_buckets(cfg: &ScoringConfig) -> ValidationResult<()> {
    if cfg.bucket_step_secs == 0 {
        return Err(invalid("bucket_step_secs", "Must be positive"));
    }
    if cfg.storage_duration_secs > MAX_STORAGE_DURATION_SECS {
        return Err(invalid(
            "storage_duration_secs",
            format!(
                "Must be at most {} (one year), got {}",
                MAX_STORAGE_DURATION_SECS, cfg.storage_duration_secs
            ),
        ));
    }
    if cfg.bucket_step_secs > cfg.storage_duration_secs {
        return Err(ValidationError::SemanticError(format!(
            "bucket_step_secs ({}) exceeds storage_duration_secs ({})",
            cfg.bucket_step_secs, cfg.storage_duration_secs
        )));
    }
    if cfg.storage_duration_secs % cfg.bucket_step_secs != 0 {
        return Err(ValidationError::SemanticError(format!(
            "storage_duration_secs ({}) must be a whole number of bucket_step_secs ({})",
            cfg.storage_duration_secs, cfg.bucket_step_secs
        )));
    }
    if cfg.bucket_count() > MAX_BUCKET_COUNT {
        return Err(invalid(
            "bucket_step_secs",
            format!(
                "storage_duration_secs / bucket_step_secs must be at most {}, got {}",
                MAX_BUCKET_COUNT,
                cfg.bucket_count()
            ),
        ));
    }
    Ok(())
}
