//! The scorer: owns every tracked item and produces rankings.
//!
//! Items are created lazily on their first event and kept for the scorer's
//! lifetime unless idle eviction is configured and invoked explicitly.
//!
//! # Locking
//!
//! The id map sits behind an `RwLock`; each item behind its own `Mutex`.
//! Events for known ids only take the map's read lock. `rank` snapshots the
//! item handles, releases the map lock, then scores items one at a time, so
//! ingestion is never blocked for the duration of a full ranking pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use thiserror::Error;
use trend_common::ItemId;
use trend_config::{validate_scoring, ScoringConfig, ValidationError};

use crate::clock::{to_delta, SharedClock, SystemClock};
use crate::counter::{CounterFactory, EventCounter, MemoryCounter};
use crate::item::{Item, ItemScore, ItemSettings};
use crate::logging::{event_names, Stage};
use crate::window::{BaselineWindow, RollingMaxWindow, WindowError, WindowFactory, WindowSpec};

/// Errors constructing a scorer.
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("invalid scoring configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("invalid baseline window: {0}")]
    Window(#[from] WindowError),
}

impl From<ScorerError> for trend_common::Error {
    fn from(err: ScorerError) -> Self {
        match err {
            ScorerError::Config(e) => trend_common::Error::InvalidScoring(e.to_string()),
            // Validation already accepted the durations.
            ScorerError::Window(e) => trend_common::Error::Scoring(e.to_string()),
        }
    }
}

/// One ranked entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: ItemId,
    pub score: f64,
    pub probability: f64,
    pub expectation: f64,
    pub peak: f64,
    pub kl_score: f64,
}

impl ScoreRecord {
    pub fn new(id: ItemId, score: ItemScore) -> Self {
        Self {
            id,
            score: score.score,
            probability: score.probability,
            expectation: score.expectation,
            peak: score.peak,
            kl_score: score.kl_score,
        }
    }
}

type ItemHandle = Arc<Mutex<Item>>;
type ItemMap = HashMap<ItemId, ItemHandle>;

/// Trending scorer over a dynamic set of items.
pub struct Scorer {
    items: RwLock<ItemMap>,
    config: ScoringConfig,
    settings: Arc<ItemSettings>,
    counter_factory: CounterFactory,
    window_factory: WindowFactory,
    clock: SharedClock,
}

impl fmt::Debug for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scorer")
            .field("items", &self.len())
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Scorer {
    /// Scorer with the system clock and in-memory backings.
    pub fn new(config: ScoringConfig) -> Result<Self, ScorerError> {
        ScorerBuilder::new(config).build()
    }

    pub fn builder(config: ScoringConfig) -> ScorerBuilder {
        ScorerBuilder::new(config)
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Number of tracked items.
    pub fn len(&self) -> usize {
        read_map(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        read_map(&self.items).is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        read_map(&self.items).contains_key(id)
    }

    /// Record one occurrence of `id` at `at`, creating the item on first sight.
    pub fn add_event(&self, id: &str, at: DateTime<Utc>) {
        {
            let items = read_map(&self.items);
            if let Some(item) = items.get(id) {
                lock_item(item).record(at);
                return;
            }
        }

        let mut items = write_map(&self.items);
        // Another writer may have created it between the two locks.
        let item = items
            .entry(ItemId::from(id))
            .or_insert_with_key(|key| self.create_item(key));
        lock_item(item).record(at);
    }

    /// Score every item and return the top entries, highest score first.
    ///
    /// Equal scores are ordered by ascending id. Entries below the configured
    /// score threshold are dropped before truncating to `max_results`.
    pub fn rank(&self) -> Vec<ScoreRecord> {
        let started = Instant::now();
        let snapshot: Vec<(ItemId, ItemHandle)> = read_map(&self.items)
            .iter()
            .map(|(id, item)| (id.clone(), Arc::clone(item)))
            .collect();
        let tracked = snapshot.len();

        let mut records: Vec<ScoreRecord> = snapshot
            .into_iter()
            .filter_map(|(id, item)| {
                let score = lock_item(&item).score()?;
                Some(ScoreRecord::new(id, score))
            })
            .collect();
        let scored = records.len();

        records.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        if let Some(threshold) = self.config.score_threshold {
            records.retain(|r| r.score >= threshold);
        }
        records.truncate(self.config.max_results);

        tracing::debug!(
            event = event_names::RANK_COMPLETED,
            stage = %Stage::Rank,
            tracked,
            scored,
            returned = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ranking completed"
        );
        records
    }

    /// Score a single item; `None` for an unknown id or insufficient activity.
    pub fn score_one(&self, id: &str) -> Option<ScoreRecord> {
        let (key, item) = {
            let items = read_map(&self.items);
            let (key, item) = items.get_key_value(id)?;
            (key.clone(), Arc::clone(item))
        };
        let score = lock_item(&item).score()?;
        Some(ScoreRecord::new(key, score))
    }

    /// Drop items whose latest event is older than the configured idle
    /// threshold. Returns the number removed; 0 when eviction is disabled.
    pub fn evict_idle(&self) -> usize {
        let Some(idle) = self.config.idle_eviction() else {
            return 0;
        };
        let now = self.clock.now();
        let Some(cutoff) = now.checked_sub_signed(to_delta(idle)) else {
            return 0;
        };

        let mut items = write_map(&self.items);
        let before = items.len();
        items.retain(|id, item| {
            let keep = lock_item(item)
                .last_event_at()
                .is_some_and(|last| last >= cutoff);
            if !keep {
                tracing::debug!(event = event_names::ITEM_EVICTED, id = %id, "evicted idle item");
            }
            keep
        });
        let evicted = before - items.len();
        if evicted > 0 {
            tracing::info!(
                event = event_names::ITEM_EVICTED,
                evicted,
                remaining = items.len(),
                "idle items evicted"
            );
        }
        evicted
    }

    fn create_item(&self, id: &ItemId) -> ItemHandle {
        tracing::debug!(event = event_names::ITEM_CREATED, id = %id, "tracking new item");
        Arc::new(Mutex::new(Item::new(
            id.clone(),
            (self.counter_factory)(id),
            (self.window_factory)(id),
            Arc::clone(&self.settings),
            Arc::clone(&self.clock),
        )))
    }
}

/// Builder for [`Scorer`] with pluggable clock and backings.
pub struct ScorerBuilder {
    config: ScoringConfig,
    clock: Option<SharedClock>,
    counter_factory: Option<CounterFactory>,
    window_factory: Option<WindowFactory>,
}

impl ScorerBuilder {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            clock: None,
            counter_factory: None,
            window_factory: None,
        }
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_counter_factory(mut self, factory: CounterFactory) -> Self {
        self.counter_factory = Some(factory);
        self
    }

    pub fn with_window_factory(mut self, factory: WindowFactory) -> Self {
        self.window_factory = Some(factory);
        self
    }

    pub fn build(self) -> Result<Scorer, ScorerError> {
        validate_scoring(&self.config)?;
        let spec = WindowSpec::new(self.config.bucket_step(), self.config.storage_duration())?;
        let clock: SharedClock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let counter_factory = self.counter_factory.unwrap_or_else(|| {
            let clock = Arc::clone(&clock);
            let retention = self.config.storage_duration();
            let factory: CounterFactory = Arc::new(move |_: &ItemId| -> Box<dyn EventCounter> {
                Box::new(MemoryCounter::with_retention(retention, Arc::clone(&clock)))
            });
            factory
        });
        let window_factory = self.window_factory.unwrap_or_else(|| {
            let clock = Arc::clone(&clock);
            let factory: WindowFactory = Arc::new(move |_: &ItemId| -> Box<dyn BaselineWindow> {
                Box::new(RollingMaxWindow::new(spec, Arc::clone(&clock)))
            });
            factory
        });

        Ok(Scorer {
            items: RwLock::new(HashMap::new()),
            settings: Arc::new(ItemSettings::from_config(&self.config)),
            config: self.config,
            counter_factory,
            window_factory,
            clock,
        })
    }
}

fn read_map(map: &RwLock<ItemMap>) -> RwLockReadGuard<'_, ItemMap> {
    map.read().unwrap_or_else(|e| e.into_inner())
}

fn write_map(map: &RwLock<ItemMap>) -> RwLockWriteGuard<'_, ItemMap> {
    map.write().unwrap_or_else(|e| e.into_inner())
}

fn lock_item(item: &Mutex<Item>) -> MutexGuard<'_, Item> {
    item.lock().unwrap_or_else(|e| e.into_inner())
}
