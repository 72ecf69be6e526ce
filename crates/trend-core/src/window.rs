//! Rolling maximum baseline window.
//!
//! A fixed-length circular buffer holding, per time bucket, the largest value
//! inserted during that bucket. Aging is pull-based: every read or write first
//! catches the buffer up to the clock, zeroing buckets that fell out of the
//! retention window. No background timer is involved.
//!
//! ```text
//!  end (boundary)                                    now
//!    |<----------------- duration ------------------>|
//!    [ oldest | ... | ... | ... | ... | ... | newest ]
//!                                            ^ writes land here
//! ```

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use trend_common::ItemId;

use crate::clock::{to_delta, truncate, SharedClock};

/// Errors building a window.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("bucket step must be positive")]
    ZeroStep,

    #[error("retention {duration_secs}s is shorter than one bucket step of {step_secs}s")]
    RetentionTooShort { duration_secs: u64, step_secs: u64 },
}

/// Baseline source consulted by an item before each new observation.
pub trait BaselineWindow: Send + fmt::Debug {
    /// Record `value` in the active bucket, keeping the larger value.
    fn insert(&mut self, value: f64);

    /// Largest value across the retention window; 0 when empty.
    fn current_max(&mut self) -> f64;
}

/// Builds one baseline window per item.
pub type WindowFactory = Arc<dyn Fn(&ItemId) -> Box<dyn BaselineWindow> + Send + Sync>;

/// Validated bucket geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    step: Duration,
    duration: Duration,
    length: usize,
}

impl WindowSpec {
    /// `duration / step` buckets of width `step`. A duration that is not a
    /// whole number of steps is rounded down to one.
    pub fn new(
        step: std::time::Duration,
        duration: std::time::Duration,
    ) -> Result<Self, WindowError> {
        if step.is_zero() {
            return Err(WindowError::ZeroStep);
        }
        let length = (duration.as_millis() / step.as_millis().max(1)) as usize;
        if length == 0 {
            return Err(WindowError::RetentionTooShort {
                duration_secs: duration.as_secs(),
                step_secs: step.as_secs(),
            });
        }
        Ok(Self {
            step: to_delta(step),
            duration: to_delta(duration),
            length,
        })
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Circular buffer of per-bucket maxima over a bounded retention window.
#[derive(Debug)]
pub struct RollingMaxWindow {
    buffer: Vec<f64>,
    spec: WindowSpec,
    /// Boundary trailing "now" by the retention duration.
    end: DateTime<Utc>,
    oldest: usize,
    newest: usize,
    clock: SharedClock,
}

impl RollingMaxWindow {
    pub fn new(spec: WindowSpec, clock: SharedClock) -> Self {
        let now = clock.now();
        let length = spec.len();
        Self {
            buffer: vec![0.0; length],
            end: boundary(now, &spec),
            oldest: 1 % length,
            newest: 0,
            spec,
            clock,
        }
    }

    pub fn spec(&self) -> &WindowSpec {
        &self.spec
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when every bucket is zero, without advancing.
    pub fn is_empty(&self) -> bool {
        self.buffer.iter().all(|v| *v == 0.0)
    }

    /// Catch the buffer up to the clock.
    fn advance(&mut self) {
        let new_end = boundary(self.clock.now(), &self.spec);
        if new_end <= self.end {
            return;
        }

        let step_ms = self.spec.step.num_milliseconds().max(1);
        let gap_ms = (new_end - self.end).num_milliseconds();
        let steps = (gap_ms + step_ms - 1) / step_ms;
        let length = self.buffer.len();

        if steps as u128 >= length as u128 {
            // Everything aged out: same result as `length` single shifts.
            self.buffer.fill(0.0);
            self.newest = (self.newest + (steps as u128 % length as u128) as usize) % length;
            self.oldest = (self.newest + 1) % length;
            self.end = self
                .end
                .checked_add_signed(Duration::milliseconds(step_ms.saturating_mul(steps)))
                .unwrap_or(new_end);
            return;
        }

        while new_end > self.end {
            self.end += self.spec.step;
            self.buffer[self.oldest] = 0.0;
            self.newest = self.oldest;
            self.oldest = (self.oldest + 1) % length;
        }
    }
}

impl BaselineWindow for RollingMaxWindow {
    fn insert(&mut self, value: f64) {
        self.advance();
        if value > self.buffer[self.newest] {
            self.buffer[self.newest] = value;
        }
    }

    fn current_max(&mut self) -> f64 {
        self.advance();
        self.buffer.iter().copied().fold(0.0, f64::max)
    }
}

fn boundary(now: DateTime<Utc>, spec: &WindowSpec) -> DateTime<Utc> {
    let floored = truncate(now, spec.step);
    floored
        .checked_sub_signed(spec.duration)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
