//! Diagnostic types for scan results.
//!
//! Every diagnostic is self-contained: the reporter (CLI text, JSON) needs
//! nothing beyond the diagnostic itself to display it. A file produces at most
//! one diagnostic per scan.

use std::fmt;

use enum_dispatch::enum_dispatch;
use serde::{Serialize, Serializer, ser::SerializeStruct};

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each diagnostic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    SyntaxError,
    UndefinedName,
    ReadError,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::SyntaxError => write!(f, "syntax-error"),
            Rule::UndefinedName => write!(f, "undefined-name"),
            Rule::ReadError => write!(f, "read-error"),
        }
    }
}

// ============================================================
// Line
// ============================================================

/// Line a diagnostic points at.
///
/// File-level findings (undefined names, unreadable files) have no meaningful
/// line and use `Unknown`, rendered as `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Line {
    /// 1-based line number.
    Known(usize),
    Unknown,
}

impl Line {
    pub fn number(self) -> Option<usize> {
        match self {
            Line::Known(n) => Some(n),
            Line::Unknown => None,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Known(n) => write!(f, "{}", n),
            Line::Unknown => write!(f, "?"),
        }
    }
}

impl Serialize for Line {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Line::Known(n) => serializer.serialize_u64(*n as u64),
            Line::Unknown => serializer.serialize_str("?"),
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// First syntax error found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorIssue {
    pub file_path: String,
    /// 1-based line of the error.
    pub line: usize,
    /// 1-based column (in characters) of the error.
    pub col: usize,
    /// Message from the parser or compiler stage.
    pub message: String,
    /// The offending source line, when it could be recovered.
    pub source_line: Option<String>,
}

impl SyntaxErrorIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::SyntaxError
    }
}

/// Names read somewhere in a file but never bound in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedNamesIssue {
    pub file_path: String,
    /// Sorted and deduplicated.
    pub names: Vec<String>,
}

impl UndefinedNamesIssue {
    pub fn new(file_path: impl Into<String>, names: impl IntoIterator<Item = String>) -> Self {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names.dedup();
        Self {
            file_path: file_path.into(),
            names,
        }
    }

    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::UndefinedName
    }
}

/// File discovered by the walk but unreadable when it was compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadErrorIssue {
    pub file_path: String,
    pub error: String,
}

impl ReadErrorIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::ReadError
    }
}

// ============================================================
// Report Trait
// ============================================================

/// Source context used to draw a caret under the offending column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSnippet<'a> {
    pub line: usize,
    pub col: usize,
    pub text: &'a str,
}

/// Common interface for everything the reporters print.
///
/// Uses `enum_dispatch` so `Diagnostic` forwards to the concrete issue type
/// without dynamic dispatch.
#[enum_dispatch]
pub trait Report {
    fn file_path(&self) -> &str;

    fn line(&self) -> Line;

    /// Human-readable message.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// 1-based column, for issues tied to a precise position.
    fn col(&self) -> Option<usize> {
        None
    }

    fn snippet(&self) -> Option<SourceSnippet<'_>> {
        None
    }
}

impl Report for SyntaxErrorIssue {
    fn file_path(&self) -> &str {
        &self.file_path
    }

    fn line(&self) -> Line {
        Line::Known(self.line)
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn col(&self) -> Option<usize> {
        Some(self.col)
    }

    fn snippet(&self) -> Option<SourceSnippet<'_>> {
        self.source_line.as_deref().map(|text| SourceSnippet {
            line: self.line,
            col: self.col,
            text,
        })
    }
}

impl Report for UndefinedNamesIssue {
    fn file_path(&self) -> &str {
        &self.file_path
    }

    fn line(&self) -> Line {
        Line::Unknown
    }

    fn message(&self) -> String {
        format!("Undefined names: {}", self.names.join(", "))
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for ReadErrorIssue {
    fn file_path(&self) -> &str {
        &self.file_path
    }

    fn line(&self) -> Line {
        Line::Unknown
    }

    fn message(&self) -> String {
        format!("Could not read file: {}", self.error)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

// ============================================================
// Diagnostic Enum
// ============================================================

/// A single reported problem.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    SyntaxError(SyntaxErrorIssue),
    UndefinedNames(UndefinedNamesIssue),
    ReadError(ReadErrorIssue),
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Diagnostic", 5)?;
        state.serialize_field("file", self.file_path())?;
        state.serialize_field("line", &self.line())?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("rule", &self.report_rule().to_string())?;
        state.serialize_field("severity", &self.report_severity().to_string())?;
        state.end()
    }
}
