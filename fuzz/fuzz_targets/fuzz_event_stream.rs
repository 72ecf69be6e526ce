//! Fuzz target for scoring arbitrary event streams.
//!
//! Feeds events at arbitrary offsets (including the future) through a
//! scorer while the clock moves, and checks the ranking stays well formed.

#![no_main]

use arbitrary::Arbitrary;
use chrono::{Duration, TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;
use trend_config::ScoringConfig;
use trend_core::{Clock, ManualClock, Scorer};

#[derive(Debug, Arbitrary)]
enum Step {
    Event { id: u8, offset_secs: i32 },
    Advance { secs: u16 },
    Rank,
}

#[derive(Debug, Arbitrary)]
struct Input {
    max_results: u8,
    threshold: Option<u8>,
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    let cfg = ScoringConfig {
        recent_duration_secs: 60,
        storage_duration_secs: 3600,
        bucket_step_secs: 600,
        max_results: usize::from(input.max_results.max(1)),
        score_threshold: input.threshold.map(|t| f64::from(t) / 100.0),
        ..ScoringConfig::default()
    };
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ));
    let scorer = Scorer::builder(cfg.clone())
        .with_clock(clock.clone())
        .build()
        .unwrap();

    for step in input.steps {
        match step {
            Step::Event { id, offset_secs } => {
                let at = clock.now() + Duration::seconds(i64::from(offset_secs));
                scorer.add_event(&format!("{id}"), at);
            }
            Step::Advance { secs } => clock.advance(Duration::seconds(i64::from(secs))),
            Step::Rank => {
                let ranking = scorer.rank();
                assert!(ranking.len() <= cfg.max_results);
                for pair in ranking.windows(2) {
                    assert!(pair[0].score >= pair[1].score);
                }
                for r in &ranking {
                    assert!(r.score.is_finite());
                    assert!(r.peak >= 0.0);
                }
            }
        }
    }
});
