//! Rendering of ranking reports.
//!
//! JSON is the canonical shape; the other formats are views of the same
//! [`RankingReport`].

use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use trend_common::{OutputFormat, Result, SCHEMA_VERSION};

use crate::config::ConfigSnapshot;
use crate::ingest::IngestStats;
use crate::scorer::ScoreRecord;

/// One row of a report, flattened for schema generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedEntry {
    pub rank: usize,
    pub id: String,
    pub score: f64,
    pub probability: f64,
    pub expectation: f64,
    pub peak: f64,
    pub kl_score: f64,
}

/// Output of the `rank` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankingReport {
    pub schema_version: String,
    /// Instant the ranking was computed for.
    pub generated_at: DateTime<Utc>,
    pub items_tracked: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest: Option<IngestSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigSnapshot>,
    pub results: Vec<RankedEntry>,
}

/// Ingestion counters as embedded in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IngestSummary {
    pub lines: usize,
    pub events: usize,
    pub skipped: usize,
}

impl From<IngestStats> for IngestSummary {
    fn from(stats: IngestStats) -> Self {
        Self {
            lines: stats.lines,
            events: stats.events,
            skipped: stats.skipped,
        }
    }
}

impl RankingReport {
    pub fn new(generated_at: DateTime<Utc>, items_tracked: usize, records: Vec<ScoreRecord>) -> Self {
        let results = records
            .into_iter()
            .enumerate()
            .map(|(idx, r)| RankedEntry {
                rank: idx + 1,
                id: r.id.0,
                score: r.score,
                probability: r.probability,
                expectation: r.expectation,
                peak: r.peak,
                kl_score: r.kl_score,
            })
            .collect();
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at,
            items_tracked,
            ingest: None,
            config: None,
            results,
        }
    }

    pub fn with_ingest(mut self, stats: IngestStats) -> Self {
        self.ingest = Some(stats.into());
        self
    }

    pub fn with_config(mut self, snapshot: ConfigSnapshot) -> Self {
        self.config = Some(snapshot);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Render `report` in `format`. The result ends with a newline.
pub fn render(report: &RankingReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(report)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Jsonl => {
            let mut out = String::new();
            for entry in &report.results {
                out.push_str(&serde_json::to_string(entry)?);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Md => Ok(render_markdown(report)),
        OutputFormat::Summary => Ok(render_summary(report)),
    }
}

fn render_markdown(report: &RankingReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# Trending at {}\n",
        report.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    if report.results.is_empty() {
        let _ = writeln!(
            out,
            "_Nothing trending among {} tracked items._",
            report.items_tracked
        );
        return out;
    }
    out.push_str("| Rank | Id | Score | Probability | Expectation | Peak | KL |\n");
    out.push_str("|-----:|----|------:|------------:|------------:|-----:|---:|\n");
    for e in &report.results {
        let _ = writeln!(
            out,
            "| {} | {} | {:.6} | {:.6} | {:.6} | {:.6} | {:.6} |",
            e.rank,
            escape_cell(&e.id),
            e.score,
            e.probability,
            e.expectation,
            e.peak,
            e.kl_score
        );
    }
    let _ = writeln!(out, "\n{} items tracked.", report.items_tracked);
    out
}

fn render_summary(report: &RankingReport) -> String {
    match report.results.first() {
        None => format!(
            "nothing trending ({} items tracked)\n",
            report.items_tracked
        ),
        Some(top) => format!(
            "{} trending of {} tracked; top: {} ({:.4})\n",
            report.results.len(),
            report.items_tracked,
            top.id,
            top.score
        ),
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}
