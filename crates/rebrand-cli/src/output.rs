//! Output formatting for rebrand
//!
//! Console output (colored summary, per-change lines, unified diffs) and the
//! JSON report file.

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::process::{FileResult, RunReport};

/// JSON report document
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub version: &'static str,
    pub generated_at: String,
    #[serde(flatten)]
    pub report: &'a RunReport,
}

impl<'a> JsonReport<'a> {
    pub fn new(report: &'a RunReport) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            generated_at: chrono::Utc::now().to_rfc3339(),
            report,
        }
    }
}

/// Serialize `report` as pretty JSON to `writer`
pub fn write_json<W: Write>(report: &RunReport, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &JsonReport::new(report))
        .context("Failed to serialize report")?;
    writeln!(writer)?;
    Ok(())
}

/// Write the JSON report to `path`
pub fn write_json_report(report: &RunReport, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_json(report, &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

/// Console renderer for a finished run
pub struct Reporter {
    verbose: bool,
    diff: bool,
}

impl Reporter {
    pub fn new(verbose: bool, diff: bool) -> Self {
        Self { verbose, diff }
    }

    /// Per-file output: one line per change with `verbose`, a unified diff
    /// per changed file with `diff`
    pub fn render_files<W: Write>(&self, report: &RunReport, out: &mut W) -> io::Result<()> {
        for result in &report.results {
            if result.has_error() || !result.changed {
                continue;
            }
            if self.verbose {
                render_change_lines(result, out)?;
            }
            if self.diff {
                if let (Some(old), Some(new)) = (&result.original_content, &result.final_content) {
                    render_unified_diff(&result.path, old, new, out)?;
                }
            }
        }
        Ok(())
    }

    /// One warning line per failed file
    pub fn render_errors<W: Write>(&self, report: &RunReport, out: &mut W) -> io::Result<()> {
        for result in &report.results {
            if let Some(error) = &result.error {
                writeln!(out, "{}: {} - {}", "Warning".yellow(), result.path.display(), error)?;
            }
        }
        Ok(())
    }

    pub fn render_summary<W: Write>(&self, report: &RunReport, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", "Summary".bold().underline())?;
        writeln!(out, "  Categories: {}", report.categories.join(", "))?;
        writeln!(out, "  Files scanned: {}", report.files_scanned)?;
        if report.dry_run {
            writeln!(out, "  Files that would change: {}", report.files_changed)?;
        } else {
            writeln!(out, "  Files changed: {}", report.files_changed)?;
        }
        writeln!(out, "  Total changes: {}", report.total_changes)?;
        if report.errors > 0 {
            writeln!(out, "  Errors: {}", report.errors.to_string().red())?;
        }
        if report.cancelled {
            writeln!(out, "  {}", "Run was cancelled before all files were processed".yellow())?;
        }

        if report.dry_run && report.total_changes > 0 {
            writeln!(out)?;
            writeln!(out, "{}", "Dry run: no files were written".yellow())?;
        }
        Ok(())
    }
}

/// `path:line:col [rule] before -> after`
fn render_change_lines<W: Write>(result: &FileResult, out: &mut W) -> io::Result<()> {
    for change in &result.changes {
        writeln!(
            out,
            "{}:{}:{} [{}] {} {} {}",
            result.path.display(),
            change.line,
            change.column,
            change.rule_id.cyan(),
            change.before.red(),
            "->".dimmed(),
            change.after.green()
        )?;
    }
    Ok(())
}

/// Unified diff (diff -u compatible)
fn render_unified_diff<W: Write>(path: &Path, old: &str, new: &str, out: &mut W) -> io::Result<()> {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();

    writeln!(out, "--- a/{}", path_str)?;
    writeln!(out, "+++ b/{}", path_str)?;

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        writeln!(out, "{}", hunk.header())?;
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            write!(out, "{}{}", sign, change)?;
            if change.missing_newline() {
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
