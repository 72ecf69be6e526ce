//! Property-based tests for ranking invariants.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use trend_config::ScoringConfig;
use trend_core::{ManualClock, Scorer};

fn build(max_results: usize, score_threshold: Option<f64>) -> Scorer {
    let cfg = ScoringConfig {
        recent_duration_secs: 60,
        storage_duration_secs: 3600,
        bucket_step_secs: 600,
        max_results,
        score_threshold,
        ..ScoringConfig::default()
    };
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Scorer::builder(cfg)
        .with_clock(Arc::new(ManualClock::new(now)))
        .build()
        .expect("valid config")
}

/// (entity index, seconds before now)
fn events() -> impl Strategy<Value = Vec<(u8, i64)>> {
    prop::collection::vec((0u8..24, 0i64..3600), 1..300)
}

fn feed(scorer: &Scorer, events: &[(u8, i64)]) -> usize {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    for (id, ago) in events {
        scorer.add_event(&format!("e{id:02}"), now - Duration::seconds(*ago));
    }
    events.iter().map(|(id, _)| *id).collect::<HashSet<_>>().len()
}

proptest! {
    #[test]
    fn ranking_is_bounded_sorted_and_finite(
        events in events(),
        max_results in 1usize..16,
    ) {
        let scorer = build(max_results, None);
        let distinct = feed(&scorer, &events);
        let ranking = scorer.rank();

        prop_assert_eq!(ranking.len(), distinct.min(max_results));
        for r in &ranking {
            prop_assert!(r.score.is_finite());
            prop_assert!(r.kl_score.is_finite());
            prop_assert!(r.peak >= 0.0);
            prop_assert!(r.probability >= 0.0 && r.probability <= 1.0);
            prop_assert!(r.expectation > 0.0);
        }
        for pair in ranking.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
        let ids: HashSet<_> = ranking.iter().map(|r| r.id.clone()).collect();
        prop_assert_eq!(ids.len(), ranking.len());
    }

    #[test]
    fn threshold_only_removes_low_scores(
        events in events(),
        threshold in 0.0f64..0.5,
    ) {
        let scorer = build(100, Some(threshold));
        feed(&scorer, &events);
        for r in scorer.rank() {
            prop_assert!(r.score >= threshold);
        }
    }

    #[test]
    fn peaks_never_exceed_their_first_burst_without_new_events(
        events in events(),
        hours in 1i64..6,
    ) {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
        let cfg = ScoringConfig {
            recent_duration_secs: 60,
            storage_duration_secs: 3600,
            bucket_step_secs: 600,
            max_results: 100,
            ..ScoringConfig::default()
        };
        let scorer = Scorer::builder(cfg).with_clock(clock.clone()).build().unwrap();
        feed(&scorer, &events);

        let first = scorer.rank();
        clock.advance(Duration::hours(hours));
        let later = scorer.rank();
        for r in &later {
            let before = first.iter().find(|f| f.id == r.id).map(|f| f.peak).unwrap_or(0.0);
            prop_assert!(r.peak <= before + 1e-12);
        }
    }
}
