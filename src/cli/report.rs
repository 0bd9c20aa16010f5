//! Report formatting and printing utilities.
//!
//! Diagnostics are printed in cargo style, in discovery order, followed by the
//! scan totals. Separate from the engine so pyscan can be used as a library.

use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::ScanSummary;
use crate::issues::{Diagnostic, Line, Report, Severity, SourceSnippet};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print a scan summary as text to stdout.
pub fn report(summary: &ScanSummary) {
    report_to(summary, &mut io::stdout().lock());
}

/// Print a scan summary as text to a custom writer.
pub fn report_to<W: Write>(summary: &ScanSummary, writer: &mut W) {
    if summary.file_count == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            "warning:".bold().yellow(),
            "No Python files found"
        );
        return;
    }

    let max_line_width = calculate_max_line_width(&summary.diagnostics);
    for diagnostic in &summary.diagnostics {
        print_diagnostic(diagnostic, writer, max_line_width);
    }

    print_totals(summary, writer);
    print_outcome(summary, writer);
}

/// Print a scan summary as JSON to stdout.
pub fn report_json(summary: &ScanSummary) -> Result<()> {
    report_json_to(summary, &mut io::stdout().lock())
}

pub fn report_json_to<W: Write>(summary: &ScanSummary, writer: &mut W) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize scan summary")?;
    writeln!(writer, "{}", json).context("Failed to write scan summary")?;
    Ok(())
}

// ============================================================
// Internal Functions
// ============================================================

fn print_diagnostic<W: Write>(diagnostic: &Diagnostic, writer: &mut W, max_line_width: usize) {
    let severity = diagnostic.report_severity();
    let severity_str = match severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        diagnostic.message(),
        diagnostic.report_rule().to_string().dimmed().cyan()
    );

    // Clickable location: --> path:line[:col]
    let location = match (diagnostic.line(), diagnostic.col()) {
        (Line::Known(line), Some(col)) => format!("{}:{}:{}", diagnostic.file_path(), line, col),
        (line, _) => format!("{}:{}", diagnostic.file_path(), line),
    };
    let _ = writeln!(writer, "  {} {}", "-->".blue(), location);

    if let Some(snippet) = diagnostic.snippet() {
        print_snippet(&snippet, severity, writer, max_line_width);
    }

    let _ = writeln!(writer); // Empty line between diagnostics
}

fn print_snippet<W: Write>(
    snippet: &SourceSnippet<'_>,
    severity: Severity,
    writer: &mut W,
    max_line_width: usize,
) {
    let caret_char = match severity {
        Severity::Error => "^".red(),
        Severity::Warning => "^".yellow(),
    };

    let _ = writeln!(
        writer,
        "{:>width$} {}",
        "",
        "|".blue(),
        width = max_line_width
    );
    let _ = writeln!(
        writer,
        "{:>width$} {} {}",
        snippet.line.to_string().blue(),
        "|".blue(),
        snippet.text,
        width = max_line_width
    );

    // Caret pointing to the column (col is 1-based)
    let prefix: String = snippet
        .text
        .chars()
        .take(snippet.col.saturating_sub(1))
        .collect();
    let caret_padding = UnicodeWidthStr::width(prefix.as_str());
    let _ = writeln!(
        writer,
        "{:>width$} {} {:>padding$}{}",
        "",
        "|".blue(),
        "",
        caret_char,
        width = max_line_width,
        padding = caret_padding
    );
}

fn print_totals<W: Write>(summary: &ScanSummary, writer: &mut W) {
    let _ = writeln!(writer, "{} {}", "Python files:".bold(), summary.file_count);
    let _ = writeln!(writer, "{}  {}", "Total lines:".bold(), summary.total_lines);
    let _ = writeln!(
        writer,
        "{} {}",
        "Issues found:".bold(),
        summary.diagnostics.len()
    );
    if summary.skipped_paths > 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            "Skipped paths:".bold().yellow(),
            summary.skipped_paths
        );
    }
}

fn print_outcome<W: Write>(summary: &ScanSummary, writer: &mut W) {
    let total_errors = summary.error_count();
    let total_warnings = summary.warning_count();
    let total_problems = total_errors + total_warnings;

    if total_problems > 0 {
        let _ = writeln!(
            writer,
            "\n{} {} problems ({} {}, {} {})",
            FAILURE_MARK.red(),
            total_problems,
            total_errors,
            if total_errors == 1 { "error" } else { "errors" }.red(),
            total_warnings,
            if total_warnings == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        );
    } else {
        let _ = writeln!(
            writer,
            "\n{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} {} - no syntax or name errors found",
                summary.file_count,
                if summary.file_count == 1 { "file" } else { "files" }
            )
            .green()
        );
    }
}

fn calculate_max_line_width(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter_map(|d| d.snippet().map(|s| s.line))
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1)
}
