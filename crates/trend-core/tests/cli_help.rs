//! CLI help and argument error tests for trend-core.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn trend_core() -> Command {
    cargo_bin_cmd!("trend-core")
}

#[test]
fn help_lists_subcommands() {
    trend_core()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rank"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("schema"));
}

#[test]
fn rank_help_documents_flags() {
    trend_core()
        .args(["rank", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--events"))
        .stdout(predicate::str::contains("--now"))
        .stdout(predicate::str::contains("--strict"));
}

#[test]
fn version_flag_succeeds() {
    trend_core()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("trend-core"));
}

#[test]
fn version_subcommand_reports_crate_version() {
    trend_core()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("trend_core_version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_command_is_an_args_error() {
    trend_core()
        .arg("nonexistent-command")
        .assert()
        .code(10)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn missing_subcommand_is_an_args_error() {
    trend_core().assert().code(10);
}

#[test]
fn unknown_format_is_an_args_error() {
    trend_core()
        .args(["version", "--format", "yaml"])
        .assert()
        .code(10);
}

#[test]
fn schema_list_names_report_types() {
    trend_core()
        .args(["schema", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RankingReport"))
        .stdout(predicate::str::contains("ScoringConfig"));
}

#[test]
fn schema_for_known_type_is_json() {
    let output = trend_core()
        .args(["schema", "ScoringConfig"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let schema: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert!(schema["properties"]["half_life_secs"].is_object());
}

#[test]
fn schema_for_unknown_type_is_an_args_error() {
    trend_core()
        .args(["schema", "NoSuchType"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("unknown schema type"));
}
