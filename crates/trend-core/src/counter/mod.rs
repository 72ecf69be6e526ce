//! Event counters.
//!
//! The scorer treats a counter purely as an interval-sum oracle: record
//! occurrences at a timestamp, ask for the total over `[start, end]`. Any
//! backing that satisfies [`EventCounter`] can be plugged in through a
//! [`CounterFactory`]; [`MemoryCounter`] is the in-process default.

pub mod memory;

pub use memory::{Granularity, MemoryCounter, DEFAULT_GRANULARITIES};

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use trend_common::ItemId;

/// Errors from range queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CounterError {
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("counter backend failure: {0}")]
    Backend(String),
}

/// Timestamped increment counter.
pub trait EventCounter: Send + fmt::Debug {
    /// Add `amount` occurrences at `at`. Never fails.
    fn increase(&mut self, amount: u64, at: DateTime<Utc>);

    /// Total occurrences within `[start, end]`; 0 when nothing was recorded.
    fn range_sum(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64, CounterError>;
}

/// Builds one counter per item.
pub type CounterFactory = Arc<dyn Fn(&ItemId) -> Box<dyn EventCounter> + Send + Sync>;
