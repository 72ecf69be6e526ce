//! Trend Core - trending entity ranking
//!
//! The main entry point for trend-core, handling:
//! - Ingesting JSONL event streams
//! - Ranking entities by surprise against their own baseline
//! - Configuration inspection and validation
//! - JSON Schema output for report consumers

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use trend_common::{format_error_human, Error, OutputFormat, StructuredError, SCHEMA_VERSION};
use trend_core::config::{list_presets, load_config, ConfigOptions};
use trend_core::exit_codes::ExitCode;
use trend_core::ingest::{ingest, parse_timestamp, IngestOptions};
use trend_core::logging::{event_names, init_logging, LogConfig, LogFormat, Stage};
use trend_core::output::{render, RankingReport};
use trend_core::schema::{available_schemas, generate_all_schemas, generate_schema};
use trend_core::{ManualClock, Scorer};

/// Trend Core - rank entities by how surprising their recent activity is
#[derive(Parser)]
#[command(name = "trend-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to scoring.json (must exist)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Named preset (standard, realtime, daily); ignored when --config is given
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    quiet: u8,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest events and print the current ranking
    Rank(RankArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print JSON Schemas for configuration and report types
    Schema(SchemaArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct RankArgs {
    /// JSONL event file; omitted or "-" reads stdin
    #[arg(long, short = 'e')]
    events: Option<PathBuf>,

    /// Rank as of this RFC 3339 instant (default: current time)
    #[arg(long)]
    now: Option<String>,

    /// Override max_results from the configuration
    #[arg(long)]
    limit: Option<usize>,

    /// Fail on the first malformed event line instead of skipping it
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,

    /// Validate a scoring.json (default: the resolved one)
    Validate {
        /// File to validate
        path: Option<PathBuf>,
    },

    /// List built-in presets
    Presets,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name to print
    name: Option<String>,

    /// List available type names
    #[arg(long, conflicts_with_all = ["name", "all"])]
    list: bool,

    /// Print every schema
    #[arg(long, conflicts_with = "name")]
    all: bool,
}

fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            return code.into();
        }
    };

    let env_config = LogConfig::from_env(None, cli.global.log_format);
    let level = env_config.level.adjusted(cli.global.verbose, cli.global.quiet);
    init_logging(&env_config.with_level(level));

    tracing::debug!(event = event_names::RUN_STARTED, stage = %Stage::Init, "trend-core starting");

    let result = match &cli.command {
        Commands::Rank(args) => run_rank(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Schema(args) => run_schema(args),
        Commands::Version => print_version(&cli.global),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(err) => output_error(&cli.global, &err),
    };
    tracing::debug!(event = event_names::RUN_FINISHED, exit_code = %exit_code, "trend-core finished");
    exit_code.into()
}

fn config_options(global: &GlobalOpts) -> ConfigOptions {
    ConfigOptions {
        config_path: global.config.clone(),
        preset: global.preset.clone(),
    }
}

fn run_rank(global: &GlobalOpts, args: &RankArgs) -> Result<ExitCode, Error> {
    let resolved = load_config(&config_options(global))?;
    let mut scoring = resolved.scoring.clone();
    if let Some(limit) = args.limit {
        scoring.max_results = limit;
    }

    let now = match &args.now {
        Some(value) => parse_timestamp(value)?,
        None => Utc::now(),
    };
    let scorer = Scorer::builder(scoring)
        .with_clock(Arc::new(ManualClock::new(now)))
        .build()?;

    let options = IngestOptions {
        default_timestamp: now,
        strict: args.strict,
    };
    let stats = match &args.events {
        Some(path) if path.as_os_str() != "-" => {
            ingest(&scorer, BufReader::new(File::open(path)?), &options)?
        }
        _ => ingest(&scorer, std::io::stdin().lock(), &options)?,
    };

    let records = scorer.rank();
    let report = RankingReport::new(now, scorer.len(), records)
        .with_ingest(stats)
        .with_config(resolved.snapshot());
    write_stdout(&render(&report, global.format)?)?;
    tracing::debug!(
        event = event_names::REPORT_WRITTEN,
        stage = %Stage::Report,
        format = ?global.format,
        entries = report.results.len(),
        "report written"
    );

    Ok(if report.is_empty() {
        ExitCode::NothingTrending
    } else {
        ExitCode::Clean
    })
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> Result<ExitCode, Error> {
    match &args.command {
        ConfigCommands::Show => {
            let resolved = load_config(&config_options(global))?;
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "generated_at": Utc::now().to_rfc3339(),
                "source": resolved.snapshot(),
                "scoring": &resolved.scoring,
            });
            match global.format {
                OutputFormat::Json | OutputFormat::Jsonl => write_json(&response, global.format)?,
                OutputFormat::Summary => write_stdout(&format!(
                    "config from {}: half-life {}s, recent {}s, storage {}s, top {}\n",
                    resolved.source,
                    resolved.scoring.half_life_secs,
                    resolved.scoring.recent_duration_secs,
                    resolved.scoring.storage_duration_secs,
                    resolved.scoring.max_results,
                ))?,
                OutputFormat::Md => {
                    let mut out = format!("# Scoring configuration\n\nSource: {}\n", resolved.source);
                    if let Some(path) = &resolved.path {
                        out.push_str(&format!("Path: `{}`\n", path.display()));
                    }
                    out.push_str(&format!(
                        "\n```json\n{}\n```\n",
                        serde_json::to_string_pretty(&resolved.scoring)?
                    ));
                    write_stdout(&out)?;
                }
            }
            Ok(ExitCode::Clean)
        }
        ConfigCommands::Validate { path } => {
            let mut options = config_options(global);
            if path.is_some() {
                options.config_path = path.clone();
            }
            let resolved = load_config(&options)?;
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "status": "valid",
                "source": resolved.snapshot(),
            });
            match global.format {
                OutputFormat::Json | OutputFormat::Jsonl => write_json(&response, global.format)?,
                _ => write_stdout(&format!("valid ({})\n", resolved.source))?,
            }
            Ok(ExitCode::Clean)
        }
        ConfigCommands::Presets => {
            let presets = list_presets();
            match global.format {
                OutputFormat::Json | OutputFormat::Jsonl => {
                    let response = serde_json::json!({
                        "schema_version": SCHEMA_VERSION,
                        "presets": presets,
                    });
                    write_json(&response, global.format)?;
                }
                _ => {
                    let mut out = String::new();
                    for p in &presets {
                        out.push_str(&format!("{:<10} {}\n", p.name.as_str(), p.description));
                    }
                    write_stdout(&out)?;
                }
            }
            Ok(ExitCode::Clean)
        }
    }
}

fn run_schema(args: &SchemaArgs) -> Result<ExitCode, Error> {
    if args.list {
        let mut out = String::new();
        for (name, description) in available_schemas() {
            out.push_str(&format!("{:<16} {}\n", name, description));
        }
        write_stdout(&out)?;
        return Ok(ExitCode::Clean);
    }
    if args.all {
        write_stdout(&format!(
            "{}\n",
            serde_json::to_string_pretty(&generate_all_schemas())?
        ))?;
        return Ok(ExitCode::Clean);
    }
    let Some(name) = &args.name else {
        return Err(Error::Config(
            "schema needs a type name, --list or --all".to_string(),
        ));
    };
    match generate_schema(name) {
        Some(schema) => {
            write_stdout(&format!("{}\n", serde_json::to_string_pretty(&schema)?))?;
            Ok(ExitCode::Clean)
        }
        None => {
            eprintln!("unknown schema type: {} (see --list)", name);
            Ok(ExitCode::ArgsError)
        }
    }
}

fn print_version(global: &GlobalOpts) -> Result<ExitCode, Error> {
    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            let info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "trend_core_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            write_json(&info, global.format)?;
        }
        _ => write_stdout(&format!(
            "trend-core {}\nschema version: {}\n",
            env!("CARGO_PKG_VERSION"),
            SCHEMA_VERSION
        ))?,
    }
    Ok(ExitCode::Clean)
}

fn write_json(value: &serde_json::Value, format: OutputFormat) -> Result<(), Error> {
    let text = match format {
        OutputFormat::Jsonl => serde_json::to_string(value)?,
        _ => serde_json::to_string_pretty(value)?,
    };
    write_stdout(&format!("{}\n", text))
}

fn write_stdout(text: &str) -> Result<(), Error> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn output_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    let exit_code = ExitCode::for_error(err);
    tracing::debug!(event = event_names::INTERNAL_ERROR, code = err.code(), error = %err, "command failed");

    if global.format.is_machine_readable() {
        let response = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "status": "error",
            "exit_code": exit_code.code_name(),
            "error": StructuredError::from(err),
        });
        eprintln!("{}", response);
    } else {
        let use_color = !global.no_color && std::io::stderr().is_terminal();
        eprintln!("{}", format_error_human(err, use_color));
    }
    exit_code
}
