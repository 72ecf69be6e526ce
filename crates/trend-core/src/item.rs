//! Per-entity scoring state.
//!
//! An item turns its recent and historical event counts into a surprise
//! score relative to its own rolling baseline, and keeps a decaying peak of
//! past surprise so a burst keeps ranking for a while after it ends.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trend_common::ItemId;
use trend_config::ScoringConfig;
use trend_math::{blend, kl_divergence, rate, ExponentialDecay};

use crate::clock::{seconds_between, to_delta, SharedClock};
use crate::counter::EventCounter;
use crate::logging::event_names;
use crate::window::BaselineWindow;

/// Settings shared by every item of one scorer, derived once from the
/// scoring configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSettings {
    pub recent: Duration,
    pub storage: Duration,
    pub decay: ExponentialDecay,
    pub count_threshold: f64,
    /// Historical count substituted on an entity's first observation.
    pub default_history_count: f64,
    /// Baseline probability used while the rolling maximum is empty.
    pub default_expectation: f64,
}

impl ItemSettings {
    pub fn from_config(cfg: &ScoringConfig) -> Self {
        Self {
            recent: to_delta(cfg.recent_duration()),
            storage: to_delta(cfg.storage_duration()),
            decay: ExponentialDecay::new(cfg.half_life().as_secs_f64()),
            count_threshold: cfg.count_threshold,
            default_history_count: cfg.default_history_count(),
            default_expectation: cfg.default_expectation(),
        }
    }
}

/// Result of scoring one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemScore {
    /// Average of `kl_score` and `peak`; the ranking key.
    pub score: f64,
    pub probability: f64,
    pub expectation: f64,
    pub peak: f64,
    pub kl_score: f64,
}

/// Scoring state of one entity.
#[derive(Debug)]
pub struct Item {
    id: ItemId,
    counter: Box<dyn EventCounter>,
    window: Box<dyn BaselineWindow>,
    peak: f64,
    peak_at: DateTime<Utc>,
    last_event_at: Option<DateTime<Utc>>,
    settings: Arc<ItemSettings>,
    clock: SharedClock,
}

impl Item {
    pub fn new(
        id: ItemId,
        counter: Box<dyn EventCounter>,
        window: Box<dyn BaselineWindow>,
        settings: Arc<ItemSettings>,
        clock: SharedClock,
    ) -> Self {
        let now = clock.now();
        Self {
            id,
            counter,
            window,
            peak: 0.0,
            peak_at: now,
            last_event_at: None,
            settings,
            clock,
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Running peak as of the last scoring pass.
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// When the peak was last raised or decayed.
    pub fn peak_updated_at(&self) -> DateTime<Utc> {
        self.peak_at
    }

    /// Latest event timestamp recorded, if any.
    pub fn last_event_at(&self) -> Option<DateTime<Utc>> {
        self.last_event_at
    }

    /// Record one occurrence at `at`.
    pub fn record(&mut self, at: DateTime<Utc>) {
        self.counter.increase(1, at);
        self.last_event_at = Some(match self.last_event_at {
            Some(prev) if prev > at => prev,
            _ => at,
        });
    }

    /// Score the item as of the clock's current time.
    ///
    /// Returns `None` when recent activity is below the count threshold.
    /// Scoring mutates state: the observed rate is inserted into the baseline
    /// window (after the baseline is read) and the running peak is raised
    /// or decayed.
    pub fn score(&mut self) -> Option<ItemScore> {
        let now = self.clock.now();
        let recent_count = self.count_since(now, self.settings.recent);
        let mut total_count = self.count_since(now, self.settings.storage);

        if recent_count < self.settings.count_threshold {
            return None;
        }

        if recent_count == total_count {
            // No activity outside the recent window yet.
            total_count = recent_count + self.settings.default_history_count;
        }

        let probability = rate(recent_count, total_count);

        // The baseline must not include the current observation.
        let mut expectation = self.window.current_max();
        if expectation == 0.0 {
            expectation = self.settings.default_expectation;
        }
        self.window.insert(probability);

        let kl_score = kl_divergence(probability, expectation);
        if kl_score > self.peak {
            self.peak = kl_score;
            self.peak_at = now;
        }
        self.decay_peak(now);

        Some(ItemScore {
            score: blend(kl_score, self.peak),
            probability,
            expectation,
            peak: self.peak,
            kl_score,
        })
    }

    fn decay_peak(&mut self, now: DateTime<Utc>) {
        let elapsed = seconds_between(self.peak_at, now);
        self.peak = self.settings.decay.apply(self.peak, elapsed);
        if now > self.peak_at {
            self.peak_at = now;
        }
    }

    fn count_since(&self, now: DateTime<Utc>, span: Duration) -> f64 {
        let start = now.checked_sub_signed(span).unwrap_or(DateTime::<Utc>::MIN_UTC);
        match self.counter.range_sum(start, now) {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(
                    event = event_names::COUNTER_QUERY_FAILED,
                    id = %self.id,
                    error = %err,
                    "counter query failed; treating as zero"
                );
                0.0
            }
        }
    }
}
