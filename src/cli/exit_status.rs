use std::process::ExitCode;

use crate::core::ScanSummary;

/// Exit status of a pyscan run.
///
/// - `Success` (0): scan completed without error diagnostics
/// - `Failure` (1): scan completed and found syntax errors or undefined names
/// - `Error` (2): pyscan itself failed (bad config, missing path, I/O error)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl ExitStatus {
    /// Warnings alone (unreadable files) do not fail a scan.
    pub fn from_summary(summary: &ScanSummary) -> Self {
        if summary.error_count() > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
