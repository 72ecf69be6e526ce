//! Trend scoring math utilities.

pub mod math;

pub use math::decay::*;
pub use math::divergence::*;
