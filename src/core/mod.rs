//! Analysis engine.
//!
//! ```text
//! file_scanner ──▶ for each file (parallel):
//!                    line_counter
//!                    file_analyzer ──▶ syntax ──▶ names
//!              ──▶ ScanSummary
//! ```
//!
//! - `file_scanner`: `.py` file discovery
//! - `line_counter`: best-effort line counts
//! - `parsers`: the Python front end
//! - `syntax`: first syntax error of a file
//! - `names`: undefined-name detection
//! - `file_analyzer`: per-file state machine
//! - `scan`: whole-tree orchestration
//!
//! Nothing in this module fails: unreadable files count 0 lines, and every
//! per-file problem becomes at most one diagnostic.

pub mod file_analyzer;
pub mod file_scanner;
pub mod line_counter;
pub mod names;
pub mod parsers;
pub mod scan;
pub mod syntax;

pub use file_analyzer::{FileAnalysis, FileAnalyzer, FileState};
pub use file_scanner::{ScanResult, scan_files};
pub use line_counter::count_lines;
pub use names::{
    BuiltinSymbolProvider, EmbeddedBuiltins, NameCheck, PythonRuntime, UndefinedNameAnalyzer,
};
pub use scan::{ScanOptions, ScanSummary, Scanner};
pub use syntax::check_syntax;
