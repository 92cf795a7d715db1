//! Rendering and exporting analysis reports.
//!
//! Three file formats are supported:
//!
//! - `text` - the same layout printed to the console
//! - `csv` - one row per action or secret (`kind,name,last_seen`)
//! - `json` - the full report including run statistics
//!
//! When no format is given it is inferred from the output file's extension,
//! falling back to `text`.

use crate::config::OutputSettings;
use crate::pipeline::AnalysisReport;
use crate::utils::format::{count_noun, format_number};
use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

impl OutputFormat {
    /// Pick the format from an explicit name or the file extension.
    pub fn resolve(format: Option<&str>, path: &Path) -> Result<Self> {
        if let Some(name) = format {
            return match name.to_lowercase().as_str() {
                "text" | "txt" => Ok(Self::Text),
                "csv" => Ok(Self::Csv),
                "json" => Ok(Self::Json),
                _ => bail!("Invalid format '{}'. Use 'text', 'csv' or 'json'", name),
            };
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        Ok(match extension.as_deref() {
            Some("csv") => Self::Csv,
            Some("json") => Self::Json,
            _ => Self::Text,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Action and secret listing in the plain-text layout.
pub fn render_findings(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Actions by {}:", report.identity);
    for action in &report.actions {
        let _ = writeln!(out, "- {} ({})", action.operation, action.last_seen);
    }
    if !report.secrets.is_empty() {
        let _ = writeln!(out, "\nPotential Secrets Manager secrets:");
        for secret in &report.secrets {
            let _ = writeln!(out, "- {secret}");
        }
    }
    out
}

/// Print the report to stdout.
pub fn print_report(report: &AnalysisReport) {
    let stats = &report.stats;

    println!("\n{}", "=".repeat(80));
    println!("CLOUDTRAIL CAPABILITY ANALYSIS");
    println!("{}", "=".repeat(80));

    println!("\nSummary:");
    println!("  Identity: {}", report.identity);
    println!("  Shards listed: {}", format_number(stats.shards));
    if stats.shards_failed > 0 {
        println!(
            "  Shards with listing errors: {}",
            format_number(stats.shards_failed)
        );
    }
    println!("  Log files processed: {}", format_number(stats.files_processed));
    if stats.failed_files() > 0 {
        println!(
            "  Unreadable log files: {} (fetch {}, decompress {}, parse {})",
            format_number(stats.failed_files()),
            format_number(stats.fetch_failures),
            format_number(stats.decompress_failures),
            format_number(stats.parse_failures)
        );
    }
    println!("  Records scanned: {}", format_number(stats.records_seen));
    if stats.malformed_records > 0 {
        println!(
            "  Malformed records skipped: {}",
            format_number(stats.malformed_records)
        );
    }
    println!(
        "  Distinct actions: {}",
        count_noun(report.actions.len(), "operation", "operations")
    );

    println!();
    print!("{}", render_findings(report));
    if report.actions.is_empty() {
        println!("  (no successful actions found for this identity)");
    }

    println!("\n{}", "=".repeat(80));
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    report: &'a AnalysisReport,
}

/// Write the report to `path` in the requested format.
pub fn write_report(report: &AnalysisReport, path: &Path, format: OutputFormat) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    match format {
        OutputFormat::Text => {
            let mut writer = BufWriter::new(file);
            writer
                .write_all(render_findings(report).as_bytes())
                .context("Failed to write report")?;
            writer.flush().context("Failed to flush report")?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(["kind", "name", "last_seen"])?;
            for action in &report.actions {
                writer.write_record(["action", &action.operation, &action.last_seen])?;
            }
            for secret in &report.secrets {
                writer.write_record(["secret", secret.as_str(), ""])?;
            }
            writer.flush().context("Failed to flush CSV writer")?;
        }
        OutputFormat::Json => {
            let document = JsonReport {
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                report,
            };
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &document)
                .context("Failed to write JSON output")?;
            writer.flush().context("Failed to flush report")?;
        }
    }

    Ok(())
}

/// Resolved report destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDestination {
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl ReportDestination {
    /// Resolve the output settings up front so a bad `--format` fails
    /// before any logs are read.
    pub fn from_settings(output: &OutputSettings) -> Result<Option<Self>> {
        output
            .path
            .as_ref()
            .map(|path| {
                Ok(Self {
                    format: OutputFormat::resolve(output.format.as_deref(), path)?,
                    path: path.clone(),
                })
            })
            .transpose()
    }
}

/// Print the report and write it to the destination, if any.
pub fn emit(report: &AnalysisReport, destination: Option<&ReportDestination>) -> Result<()> {
    print_report(report);

    if let Some(dest) = destination {
        write_report(report, &dest.path, dest.format)?;
        eprintln!(
            "\nReport written to {} ({})",
            dest.path.display(),
            dest.format.name()
        );
    }

    Ok(())
}
