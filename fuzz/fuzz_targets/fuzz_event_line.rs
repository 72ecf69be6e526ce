//! Fuzz target for JSONL event line parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use trend_core::ingest::parse_line;

fuzz_target!(|data: &str| {
    // Malformed lines must surface as errors, never panics
    if let Ok(Some(event)) = parse_line(data, 1) {
        assert!(!event.id.as_str().is_empty());
    }
});
