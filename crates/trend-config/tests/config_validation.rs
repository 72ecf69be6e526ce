//! Configuration validation + resolution tests against real files.
//!
//! Covers:
//! - Loading and validating scoring.json written to disk
//! - Resolution order (CLI > TREND_CONFIG > TREND_CONFIG_DIR > defaults)
//! - Preset determinism

use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;
use trend_config::resolve::{ENV_CONFIG_DIR, ENV_CONFIG_PATH, SCORING_FILENAME};
use trend_config::{
    get_preset, list_presets, resolve_config, validate_scoring, ConfigSource, PresetName,
    ScoringConfig, ValidationError,
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let saved = keys.iter().map(|k| env::var(k).ok()).collect();
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, saved) in self.keys.iter().zip(self.saved.iter()) {
            match saved {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    f()
}

fn write_config(path: &Path, json: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create config parent");
    }
    fs::write(path, json).expect("write config");
}

#[test]
fn file_roundtrip_validates() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(SCORING_FILENAME);
    let cfg = get_preset(PresetName::Realtime);
    write_config(&path, &cfg.to_json_pretty().expect("serialize"));

    let loaded = ScoringConfig::from_file(&path).expect("load");
    assert_eq!(loaded, cfg);
    validate_scoring(&loaded).expect("valid");
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = ScoringConfig::from_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ValidationError::IoError(_)));
    assert_eq!(err.code(), 60);
}

#[test]
fn semantically_invalid_file_fails_validation() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(SCORING_FILENAME);
    write_config(&path, r#"{"max_results": 0}"#);

    let loaded = ScoringConfig::from_file(&path).expect("parses");
    let err = validate_scoring(&loaded).unwrap_err();
    assert!(err.to_string().contains("max_results"));
}

#[test]
fn cli_path_beats_environment() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().expect("tempdir");
        let cli = dir.path().join("cli.json");
        let from_env = dir.path().join("env.json");
        write_config(&cli, "{}");
        write_config(&from_env, "{}");
        env::set_var(ENV_CONFIG_PATH, &from_env);

        let paths = resolve_config(Some(&cli));
        assert_eq!(paths.scoring.as_deref(), Some(cli.as_path()));
        assert_eq!(paths.scoring_source, ConfigSource::CliArgument);
    });
}

#[test]
fn environment_path_then_dir() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().expect("tempdir");
        let direct = dir.path().join("direct.json");
        let in_dir = dir.path().join("conf").join(SCORING_FILENAME);
        write_config(&direct, "{}");
        write_config(&in_dir, "{}");

        env::set_var(ENV_CONFIG_PATH, &direct);
        env::set_var(ENV_CONFIG_DIR, dir.path().join("conf"));
        let paths = resolve_config(None);
        assert_eq!(paths.scoring.as_deref(), Some(direct.as_path()));
        assert_eq!(paths.scoring_source, ConfigSource::Environment);

        env::remove_var(ENV_CONFIG_PATH);
        let paths = resolve_config(None);
        assert_eq!(paths.scoring.as_deref(), Some(in_dir.as_path()));
        assert_eq!(paths.scoring_source, ConfigSource::Environment);
    });
}

#[test]
fn missing_cli_path_falls_through() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);
        let dir = TempDir::new().expect("tempdir");
        let env_file = dir.path().join("env.json");
        write_config(&env_file, "{}");
        env::set_var(ENV_CONFIG_PATH, &env_file);
        env::remove_var(ENV_CONFIG_DIR);

        let paths = resolve_config(Some(&dir.path().join("missing.json")));
        assert_eq!(paths.scoring.as_deref(), Some(env_file.as_path()));
    });
}

#[test]
fn presets_are_deterministic() {
    let first: Vec<_> = list_presets().into_iter().map(|p| p.config).collect();
    let second: Vec<_> = list_presets().into_iter().map(|p| p.config).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), PresetName::ALL.len());
}
