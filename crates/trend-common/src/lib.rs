//! Trend scoring common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the trend crates:
//! - Entity identity
//! - Common error types with stable codes
//! - Output formats

pub mod error;
pub mod id;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use id::ItemId;
pub use output::OutputFormat;

/// Schema version of the ranking output payload.
pub const SCHEMA_VERSION: &str = "1.0.0";
