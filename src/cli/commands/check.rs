use std::path::Path;

use anyhow::{Result, bail};
use tracing::debug;

use super::super::{
    args::{CheckCommand, OutputFormat},
    exit_status::ExitStatus,
    input::{normalize_path_input, prompt_for_path},
    report::{report, report_json},
};
use crate::{
    config::{ConfigLoadResult, load_config},
    core::{PythonRuntime, ScanOptions, ScanSummary, Scanner, UndefinedNameAnalyzer},
};

pub fn check(cmd: CheckCommand) -> Result<ExitStatus> {
    let root = match &cmd.path {
        Some(path) => normalize_path_input(path),
        None => prompt_for_path()?,
    };

    let summary = scan_project(Path::new(&root), &cmd.python)?;

    match cmd.format {
        OutputFormat::Text => report(&summary),
        OutputFormat::Json => report_json(&summary)?,
    }

    Ok(ExitStatus::from_summary(&summary))
}

/// Load the configuration that applies to `root` and scan it.
pub fn scan_project(root: &Path, python: &str) -> Result<ScanSummary> {
    if !root.is_dir() {
        bail!("Path does not exist or is not a directory: {}", root.display());
    }

    let ConfigLoadResult { config, from_file } = load_config(root)?;
    debug!(
        "Scanning {} ({})",
        root.display(),
        if from_file {
            "config file"
        } else {
            "default config"
        }
    );

    let runtime = PythonRuntime::new(python);
    let scanner = Scanner::new(
        UndefinedNameAnalyzer::new(&runtime),
        ScanOptions::from(&config),
    );

    Ok(scanner.scan(root))
}
