//! Trend Scoring Core Library
//!
//! Ranks entities by how surprising their short-term event rate is compared
//! with their own history:
//! - Time source abstraction for deterministic replay
//! - Event counters answering interval sums
//! - Rolling maximum baseline windows
//! - Per-item KL surprise scoring with a decaying peak
//! - The scorer that owns items and produces rankings
//!
//! The binary entry point is in `main.rs`.

pub mod clock;
pub mod config;
pub mod counter;
pub mod exit_codes;
pub mod ingest;
pub mod item;
pub mod logging;
pub mod output;
pub mod schema;
pub mod scorer;
pub mod window;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use counter::{CounterError, CounterFactory, EventCounter, MemoryCounter};
pub use item::{Item, ItemScore, ItemSettings};
pub use scorer::{ScoreRecord, Scorer, ScorerBuilder, ScorerError};
pub use window::{BaselineWindow, RollingMaxWindow, WindowError, WindowFactory, WindowSpec};
