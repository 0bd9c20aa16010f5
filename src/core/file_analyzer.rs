//! Per-file pipeline: syntax validation, then name analysis.
//!
//! ```text
//! Pending ──▶ SyntaxChecked ──▶ Analyzed
//!    │
//!    └──────▶ FailedSyntax
//! ```
//!
//! A file that fails validation never reaches the name check, and a file
//! yields at most one diagnostic.

use std::path::Path;

use tracing::debug;

use super::{names::NameCheck, syntax::check_syntax};
use crate::issues::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    SyntaxChecked,
    FailedSyntax,
    Analyzed,
}

impl FileState {
    pub fn is_final(self) -> bool {
        matches!(self, FileState::FailedSyntax | FileState::Analyzed)
    }
}

/// Outcome of analyzing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnalysis {
    /// Always a final state.
    pub state: FileState,
    pub diagnostic: Option<Diagnostic>,
}

pub struct FileAnalyzer<C> {
    names: C,
}

impl<C: NameCheck> FileAnalyzer<C> {
    pub fn new(names: C) -> Self {
        Self { names }
    }

    pub fn analyze(&self, path: &Path) -> FileAnalysis {
        let file_path = path.to_string_lossy();
        let mut state = FileState::Pending;

        let source = match check_syntax(path) {
            Ok(source) => source,
            Err(diagnostic) => {
                state = transition(&file_path, state, FileState::FailedSyntax);
                return FileAnalysis {
                    state,
                    diagnostic: Some(diagnostic),
                };
            }
        };
        state = transition(&file_path, state, FileState::SyntaxChecked);

        let diagnostic = self.names.check(&file_path, &source);
        FileAnalysis {
            state: transition(&file_path, state, FileState::Analyzed),
            diagnostic,
        }
    }
}

fn transition(file_path: &str, from: FileState, to: FileState) -> FileState {
    debug!("{}: {:?} -> {:?}", file_path, from, to);
    to
}
