//! Fuzz target for scoring.json parsing and validation.
//!
//! Any config that validates must build a scorer and rank without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use trend_config::{validate_scoring, ScoringConfig};
use trend_core::Scorer;

fuzz_target!(|data: &str| {
    let Ok(cfg) = ScoringConfig::from_str(data) else {
        return;
    };
    if validate_scoring(&cfg).is_err() {
        return;
    }
    if let Ok(scorer) = Scorer::new(cfg) {
        scorer.add_event("x", chrono::Utc::now());
        let _ = scorer.rank();
    }
});
