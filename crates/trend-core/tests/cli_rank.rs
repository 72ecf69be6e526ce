//! CLI tests for `trend-core rank` and `trend-core config`.
//!
//! Every invocation pins `--now` and a preset (or an explicit config file)
//! so the user's environment cannot change the results.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

const NOW: &str = "2024-06-01T12:00:00Z";

fn trend_core() -> Command {
    let mut cmd = cargo_bin_cmd!("trend-core");
    cmd.timeout(Duration::from_secs(60));
    cmd.env_remove("TREND_CONFIG");
    cmd.env_remove("TREND_CONFIG_DIR");
    cmd.env_remove("TREND_LOG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn rank() -> Command {
    let mut cmd = trend_core();
    cmd.args(["rank", "--now", NOW, "--preset", "standard"]);
    cmd
}

fn sample_events() -> String {
    let mut lines = String::new();
    for _ in 0..5 {
        lines.push_str(r#"{"id":"a","timestamp":"2024-06-01T11:59:50Z"}"#);
        lines.push('\n');
    }
    lines.push_str(r#"{"id":"b","timestamp":"2024-06-01T11:59:50Z"}"#);
    lines.push('\n');
    lines
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

// ============================================================================
// rank
// ============================================================================

#[test]
fn rank_from_stdin_puts_busier_entity_first() {
    let report = stdout_json(rank().write_stdin(sample_events()));
    assert_eq!(report["schema_version"], "1.0.0");
    assert_eq!(report["items_tracked"], 2);
    assert_eq!(report["results"][0]["id"], "a");
    assert_eq!(report["results"][0]["rank"], 1);
    assert_eq!(report["results"][1]["id"], "b");
    assert_eq!(report["ingest"]["events"], 6);
    assert_eq!(report["config"]["source"], "preset");
}

#[test]
fn rank_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    fs::write(&path, sample_events()).unwrap();

    rank()
        .arg("--events")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"a\""));
}

#[test]
fn limit_caps_results() {
    let report = stdout_json(rank().args(["--limit", "1"]).write_stdin(sample_events()));
    assert_eq!(report["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["items_tracked"], 2);
}

#[test]
fn empty_input_means_nothing_trending() {
    rank()
        .write_stdin("")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"results\": []"));
}

#[test]
fn malformed_lines_are_skipped_by_default() {
    let mut input = sample_events();
    input.push_str("not json\n");
    let report = stdout_json(rank().write_stdin(input));
    assert_eq!(report["ingest"]["skipped"], 1);
    assert_eq!(report["results"][0]["id"], "a");
}

#[test]
fn strict_mode_rejects_malformed_lines() {
    let mut input = sample_events();
    input.push_str("not json\n");
    rank().arg("--strict").write_stdin(input).assert().code(10);
}

#[test]
fn invalid_now_is_an_args_error() {
    trend_core()
        .args(["rank", "--now", "yesterday", "--preset", "standard"])
        .write_stdin(sample_events())
        .assert()
        .code(10);
}

#[test]
fn missing_events_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    rank()
        .arg("--events")
        .arg(dir.path().join("absent.jsonl"))
        .assert()
        .code(12);
}

#[test]
fn machine_errors_are_structured_on_stderr() {
    let dir = tempdir().unwrap();
    let output = rank()
        .arg("-q")
        .arg("--events")
        .arg(dir.path().join("absent.jsonl"))
        .assert()
        .code(12)
        .get_output()
        .stderr
        .clone();
    let err: Value = serde_json::from_slice(&output).expect("stderr is JSON");
    assert_eq!(err["status"], "error");
    assert_eq!(err["exit_code"], "ERR_IO");
}

#[test]
fn markdown_output_is_a_table() {
    rank()
        .args(["--format", "md"])
        .write_stdin(sample_events())
        .assert()
        .success()
        .stdout(predicate::str::contains("| Rank |"))
        .stdout(predicate::str::contains("| 1 | a |"));
}

#[test]
fn jsonl_output_has_one_line_per_entry() {
    let output = rank()
        .args(["--format", "jsonl"])
        .write_stdin(sample_events())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        serde_json::from_str::<Value>(line).expect("each line is JSON");
    }
}

#[test]
fn summary_output_names_top_item() {
    rank()
        .args(["--format", "summary"])
        .write_stdin(sample_events())
        .assert()
        .success()
        .stdout(predicate::str::contains("top: a"));
}

// ============================================================================
// config
// ============================================================================

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    trend_core()
        .args(["rank", "--now", NOW, "--config"])
        .arg(dir.path().join("missing.json"))
        .write_stdin(sample_events())
        .assert()
        .code(11);
}

#[test]
fn unknown_preset_is_a_config_error() {
    trend_core()
        .args(["rank", "--now", NOW, "--preset", "weekly"])
        .write_stdin(sample_events())
        .assert()
        .code(11);
}

#[test]
fn explicit_config_file_drives_ranking() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scoring.json");
    fs::write(&path, r#"{"max_results": 1}"#).unwrap();

    let report = stdout_json(
        trend_core()
            .args(["rank", "--now", NOW, "--config"])
            .arg(&path)
            .write_stdin(sample_events()),
    );
    assert_eq!(report["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["config"]["source"], "CLI argument");
}

#[test]
fn config_from_environment_variable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scoring.json");
    fs::write(&path, r#"{"half_life_secs": 60}"#).unwrap();

    let report = stdout_json(
        trend_core()
            .env("TREND_CONFIG", &path)
            .args(["config", "show"]),
    );
    assert_eq!(report["scoring"]["half_life_secs"], 60);
    assert_eq!(report["source"]["source"], "environment variable");
}

#[test]
fn config_presets_lists_all_presets() {
    trend_core()
        .args(["config", "presets", "--format", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("standard"))
        .stdout(predicate::str::contains("realtime"))
        .stdout(predicate::str::contains("daily"));
}

#[test]
fn config_validate_accepts_good_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scoring.json");
    fs::write(&path, r#"{"recent_duration_secs": 300}"#).unwrap();

    trend_core()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"valid\""));
}

#[test]
fn config_validate_rejects_bad_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scoring.json");
    fs::write(
        &path,
        r#"{"recent_duration_secs": 7200, "storage_duration_secs": 3600, "bucket_step_secs": 600}"#,
    )
    .unwrap();

    trend_core()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .code(11);
}

#[test]
fn config_validate_rejects_malformed_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scoring.json");
    fs::write(&path, "{ not json").unwrap();

    trend_core()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .code(11);
}

#[test]
fn config_validate_rejects_unbounded_buckets() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scoring.json");
    fs::write(&path, r#"{"bucket_step_secs": 1}"#).unwrap();

    trend_core()
        .args(["config", "validate"])
        .arg(&path)
        .assert()
        .code(11);
}
