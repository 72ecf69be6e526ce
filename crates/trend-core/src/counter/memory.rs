//! Multi-resolution in-memory counter.
//!
//! Each tier is a ring of fixed-width buckets; every increment lands in all
//! tiers. A range query is answered by the finest tier whose retention still
//! reaches back to `start`, falling back to the coarsest tier. Results are
//! bucket-aligned: the first bucket counted is the one containing `start`.

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::{CounterError, EventCounter};
use crate::clock::SharedClock;

/// Width and number of buckets of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Granularity {
    pub width: Duration,
    pub count: usize,
}

impl Granularity {
    pub const fn new(width: Duration, count: usize) -> Self {
        Self { width, count }
    }
}

/// Seconds for a minute, minutes for an hour, hours for a day, days for a
/// week. Each tier keeps one extra bucket so a query reaching back exactly
/// its full span (say the last 60 seconds) is still answered by that tier.
pub const DEFAULT_GRANULARITIES: [Granularity; 4] = [
    Granularity::new(Duration::from_secs(1), 61),
    Granularity::new(Duration::from_secs(60), 61),
    Granularity::new(Duration::from_secs(60 * 60), 25),
    Granularity::new(Duration::from_secs(24 * 60 * 60), 8),
];

const EMPTY: i64 = i64::MIN;

#[derive(Debug, Clone, Copy)]
struct Slot {
    start_ms: i64,
    count: u64,
}

#[derive(Debug, Clone)]
struct Tier {
    width_ms: i64,
    slots: Vec<Slot>,
}

impl Tier {
    fn new(g: Granularity) -> Self {
        Self {
            width_ms: g.width.as_millis().min(i64::MAX as u128) as i64,
            slots: vec![
                Slot {
                    start_ms: EMPTY,
                    count: 0
                };
                g.count
            ],
        }
    }

    fn floor(&self, ms: i64) -> i64 {
        ms - ms.rem_euclid(self.width_ms)
    }

    fn slot_index(&self, bucket_ms: i64) -> usize {
        (bucket_ms.div_euclid(self.width_ms)).rem_euclid(self.slots.len() as i64) as usize
    }

    fn add(&mut self, amount: u64, at_ms: i64) {
        let bucket = self.floor(at_ms);
        let idx = self.slot_index(bucket);
        let slot = &mut self.slots[idx];
        if slot.start_ms == bucket {
            slot.count = slot.count.saturating_add(amount);
        } else if slot.start_ms < bucket {
            *slot = Slot {
                start_ms: bucket,
                count: amount,
            };
        }
        // else: the slot already holds a newer bucket; this write has aged out.
    }

    /// Whether the ring still holds the bucket containing `start_ms`.
    fn covers(&self, start_ms: i64, now_ms: i64) -> bool {
        let span = self.width_ms.saturating_mul(self.slots.len() as i64 - 1);
        self.floor(start_ms) >= self.floor(now_ms).saturating_sub(span)
    }

    fn sum(&self, start_ms: i64, end_ms: i64) -> u64 {
        let first = self.floor(start_ms);
        self.slots
            .iter()
            .filter(|s| s.start_ms != EMPTY && s.start_ms >= first && s.start_ms <= end_ms)
            .fold(0u64, |acc, s| acc.saturating_add(s.count))
    }
}

/// Tiered bucket counter kept in process memory.
#[derive(Debug)]
pub struct MemoryCounter {
    tiers: Vec<Tier>,
    clock: SharedClock,
}

impl MemoryCounter {
    /// Counter with [`DEFAULT_GRANULARITIES`].
    pub fn new(clock: SharedClock) -> Self {
        Self {
            tiers: DEFAULT_GRANULARITIES.iter().copied().map(Tier::new).collect(),
            clock,
        }
    }

    /// Default tiers with the coarsest one stretched so a query reaching
    /// `retention` back from now is still answered exactly.
    pub fn with_retention(retention: Duration, clock: SharedClock) -> Self {
        let mut granularities = DEFAULT_GRANULARITIES;
        if let Some(last) = granularities.last_mut() {
            let width = last.width.as_millis().max(1);
            let needed = retention.as_millis().div_ceil(width) + 1;
            last.count = last.count.max(needed.min(usize::MAX as u128) as usize);
        }
        Self {
            tiers: granularities.iter().copied().map(Tier::new).collect(),
            clock,
        }
    }

    /// Counter with custom tiers, ordered finest first.
    pub fn with_granularities(
        granularities: &[Granularity],
        clock: SharedClock,
    ) -> Result<Self, CounterError> {
        if granularities.is_empty() {
            return Err(CounterError::Backend(
                "at least one granularity is required".to_string(),
            ));
        }
        if let Some(bad) = granularities
            .iter()
            .find(|g| g.width.as_millis() == 0 || g.count == 0)
        {
            return Err(CounterError::Backend(format!(
                "granularity needs a positive width and count, got {:?}",
                bad
            )));
        }
        let mut tiers: Vec<Tier> = granularities.iter().copied().map(Tier::new).collect();
        tiers.sort_by_key(|t| t.width_ms);
        Ok(Self { tiers, clock })
    }

    /// Retention of the coarsest tier.
    pub fn retention(&self) -> Duration {
        self.tiers
            .last()
            .map(|t| Duration::from_millis((t.width_ms as u64).saturating_mul(t.slots.len() as u64)))
            .unwrap_or_default()
    }
}

impl EventCounter for MemoryCounter {
    fn increase(&mut self, amount: u64, at: DateTime<Utc>) {
        let at_ms = at.timestamp_millis();
        for tier in &mut self.tiers {
            tier.add(amount, at_ms);
        }
    }

    fn range_sum(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<f64, CounterError> {
        if start > end {
            return Err(CounterError::InvalidRange { start, end });
        }
        let start_ms = start.timestamp_millis();
        let end_ms = end.timestamp_millis();
        let now_ms = self.clock.now().timestamp_millis();

        let tier = match self
            .tiers
            .iter()
            .find(|t| t.covers(start_ms, now_ms))
            .or_else(|| self.tiers.last())
        {
            Some(tier) => tier,
            None => return Ok(0.0),
        };

        Ok(tier.sum(start_ms, end_ms) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn setup() -> (Arc<ManualClock>, MemoryCounter, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 20).unwrap();
        let clock = Arc::new(ManualClock::new(now));
        let counter = MemoryCounter::new(clock.clone());
        (clock, counter, now)
    }

    #[test]
    fn empty_counter_sums_to_zero() {
        let (_clock, counter, now) = setup();
        assert_eq!(
            counter
                .range_sum(now - chrono::Duration::days(7), now)
                .unwrap(),
            0.0
        );
    }

    #[test]
    fn single_event_visible_in_short_and_long_ranges() {
        let (_clock, mut counter, now) = setup();
        counter.increase(1, now);
        let recent = counter
            .range_sum(now - chrono::Duration::minutes(1), now)
            .unwrap();
        let total = counter
            .range_sum(now - chrono::Duration::days(7), now)
            .unwrap();
        assert_eq!(recent, 1.0);
        assert_eq!(total, 1.0);
    }

    #[test]
    fn older_events_only_in_longer_ranges() {
        let (_clock, mut counter, now) = setup();
        counter.increase(5, now - chrono::Duration::hours(2));
        counter.increase(3, now);
        assert_eq!(
            counter
                .range_sum(now - chrono::Duration::minutes(1), now)
                .unwrap(),
            3.0
        );
        assert_eq!(
            counter
                .range_sum(now - chrono::Duration::hours(3), now)
                .unwrap(),
            8.0
        );
        assert_eq!(
            counter
                .range_sum(now - chrono::Duration::days(7), now)
                .unwrap(),
            8.0
        );
    }

    #[test]
    fn recent_minute_is_exact_at_second_resolution() {
        let (_clock, mut counter, now) = setup();
        counter.increase(1, now - chrono::Duration::seconds(61));
        counter.increase(2, now - chrono::Duration::seconds(60));
        counter.increase(4, now - chrono::Duration::seconds(5));
        assert_eq!(
            counter
                .range_sum(now - chrono::Duration::seconds(60), now)
                .unwrap(),
            6.0
        );
    }

    #[test]
    fn future_events_are_excluded() {
        let (_clock, mut counter, now) = setup();
        counter.increase(2, now + chrono::Duration::hours(1));
        assert_eq!(
            counter
                .range_sum(now - chrono::Duration::hours(1), now)
                .unwrap(),
            0.0
        );
    }

    #[test]
    fn inverted_range_is_an_error() {
        let (_clock, counter, now) = setup();
        let err = counter
            .range_sum(now, now - chrono::Duration::minutes(1))
            .unwrap_err();
        assert!(matches!(err, CounterError::InvalidRange { .. }));
    }

    #[test]
    fn stale_writes_do_not_clobber_newer_buckets() {
        let (_clock, mut counter, now) = setup();
        counter.increase(1, now);
        // Same day-slot, sixteen days earlier.
        counter.increase(4, now - chrono::Duration::days(16));
        assert_eq!(
            counter
                .range_sum(now - chrono::Duration::days(30), now)
                .unwrap(),
            1.0
        );
    }

    #[test]
    fn events_age_out_as_clock_moves() {
        let (clock, mut counter, now) = setup();
        counter.increase(1, now);
        clock.advance(chrono::Duration::days(8));
        let later = clock.now();
        assert_eq!(
            counter
                .range_sum(later - chrono::Duration::days(7), later)
                .unwrap(),
            0.0
        );
    }

    #[test]
    fn retention_stretches_coarsest_tier() {
        let (clock, _counter, now) = setup();
        let mut counter =
            MemoryCounter::with_retention(Duration::from_secs(30 * 24 * 3600), clock.clone());
        assert_eq!(counter.retention(), Duration::from_secs(31 * 24 * 3600));

        counter.increase(2, now - chrono::Duration::days(20));
        counter.increase(1, now);
        assert_eq!(
            counter
                .range_sum(now - chrono::Duration::days(30), now)
                .unwrap(),
            3.0
        );

        // Never shrinks below the default tiers.
        let small = MemoryCounter::with_retention(Duration::from_secs(3600), clock);
        assert_eq!(small.retention(), Duration::from_secs(8 * 24 * 3600));
    }

    #[test]
    fn custom_granularities_validated() {
        let clock: SharedClock = Arc::new(ManualClock::new(Utc::now()));
        assert!(MemoryCounter::with_granularities(&[], clock.clone()).is_err());
        assert!(MemoryCounter::with_granularities(
            &[Granularity::new(Duration::ZERO, 10)],
            clock.clone()
        )
        .is_err());

        let counter = MemoryCounter::with_granularities(
            &[
                Granularity::new(Duration::from_secs(3600), 24),
                Granularity::new(Duration::from_secs(60), 60),
            ],
            clock,
        )
        .expect("valid tiers");
        assert_eq!(counter.retention(), Duration::from_secs(24 * 3600));
    }
}
