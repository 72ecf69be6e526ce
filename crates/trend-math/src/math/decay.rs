//! Exponential half-life decay.

use serde::{Deserialize, Serialize};

/// Multiplier `0.5 ^ (elapsed / half_life)`.
///
/// Negative elapsed time (a clock stepping backwards) is clamped to zero so
/// the multiplier never exceeds 1. A non-positive half-life decays
/// everything immediately.
pub fn decay_multiplier(elapsed_secs: f64, half_life_secs: f64) -> f64 {
    let elapsed = if elapsed_secs.is_nan() {
        0.0
    } else {
        elapsed_secs.max(0.0)
    };
    if elapsed == 0.0 {
        return 1.0;
    }
    if !(half_life_secs > 0.0) {
        return 0.0;
    }
    0.5f64.powf(elapsed / half_life_secs)
}

/// Half-life decay law with a fixed half-life.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialDecay {
    /// Seconds for a value to fall to half.
    pub half_life_secs: f64,
}

impl ExponentialDecay {
    pub fn new(half_life_secs: f64) -> Self {
        Self { half_life_secs }
    }

    /// Multiplier after `elapsed_secs`.
    pub fn multiplier(&self, elapsed_secs: f64) -> f64 {
        decay_multiplier(elapsed_secs, self.half_life_secs)
    }

    /// Decay `value` over `elapsed_secs`.
    pub fn apply(&self, value: f64, elapsed_secs: f64) -> f64 {
        value * self.multiplier(elapsed_secs)
    }
}
