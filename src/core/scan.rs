use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::{
    file_analyzer::FileAnalyzer,
    file_scanner::scan_files,
    line_counter::count_lines,
    names::NameCheck,
};
use crate::{
    config::Config,
    issues::{Diagnostic, Report, Severity},
};

/// Discovery settings for a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Glob patterns, or literal paths relative to the root, to skip.
    pub ignores: Vec<String>,
    pub follow_links: bool,
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            ignores: config.ignores.clone(),
            follow_links: config.follow_links,
        }
    }
}

/// Totals and findings of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Number of `.py` files discovered.
    pub file_count: usize,
    /// Sum of the line counts of all discovered files, broken ones included.
    pub total_lines: usize,
    /// At most one per file, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
    /// Entries the walk could not read.
    pub skipped_paths: usize,
}

impl ScanSummary {
    pub fn error_count(&self) -> usize {
        self.count_severity(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_severity(Severity::Warning)
    }

    fn count_severity(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.report_severity() == severity)
            .count()
    }
}

pub struct Scanner<C> {
    analyzer: FileAnalyzer<C>,
    options: ScanOptions,
}

impl<C: NameCheck + Sync> Scanner<C> {
    pub fn new(names: C, options: ScanOptions) -> Self {
        Self {
            analyzer: FileAnalyzer::new(names),
            options,
        }
    }

    /// Scan every `.py` file below `root`.
    ///
    /// Files are processed in parallel; the result is the same as processing
    /// them one by one in discovery order.
    pub fn scan(&self, root: &Path) -> ScanSummary {
        let discovered = scan_files(root, &self.options.ignores, self.options.follow_links);

        let results: Vec<(usize, Option<Diagnostic>)> = discovered
            .files
            .par_iter()
            .map(|file_path| self.scan_file(file_path))
            .collect();

        let mut summary = ScanSummary {
            file_count: discovered.files.len(),
            skipped_paths: discovered.skipped_count,
            ..Default::default()
        };
        for (lines, diagnostic) in results {
            summary.total_lines += lines;
            summary.diagnostics.extend(diagnostic);
        }

        debug!(
            "Scanned {} file(s), {} line(s), {} diagnostic(s)",
            summary.file_count,
            summary.total_lines,
            summary.diagnostics.len()
        );
        summary
    }

    /// Line count and diagnostic of one file.
    fn scan_file(&self, file_path: &str) -> (usize, Option<Diagnostic>) {
        let path = Path::new(file_path);
        let lines = count_lines(path);
        let analysis = self.analyzer.analyze(path);
        debug!("{}: {} line(s), {:?}", file_path, lines, analysis.state);
        (lines, analysis.diagnostic)
    }
}
