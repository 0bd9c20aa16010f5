//! Undefined-name detection.
//!
//! A single walk over the module AST collects the names the file binds and the
//! names it reads. Whatever is read but neither bound nor built in is reported.
//!
//! The analysis is deliberately flat: every scope in the file shares one
//! binding set and one use set. A name bound only inside one function counts
//! as bound for the whole file, and parameters, loop targets, `with ... as`
//! targets and destructuring assignments bind nothing.
//!
//! - `node`: node kinds and the walker
//! - `collector`: binding/use collection
//! - `builtins`: built-in name providers

pub mod builtins;
pub mod collector;
pub mod node;

use std::collections::HashSet;

use rustpython_parser::ast::Stmt;
use tracing::debug;

pub use builtins::{BuiltinSymbolProvider, EmbeddedBuiltins, PythonRuntime};
pub use collector::NameCollector;

use super::parsers::python::parse_python_source;
use crate::issues::{Diagnostic, UndefinedNamesIssue};

/// Per-file name check run after the file compiled.
pub trait NameCheck {
    fn check(&self, file_path: &str, source: &str) -> Option<Diagnostic>;
}

impl<T: NameCheck + ?Sized> NameCheck for &T {
    fn check(&self, file_path: &str, source: &str) -> Option<Diagnostic> {
        (**self).check(file_path, source)
    }
}

/// Names starting with `__` are treated as always defined.
pub fn is_dunder(name: &str) -> bool {
    name.starts_with("__")
}

#[derive(Debug, Clone)]
pub struct UndefinedNameAnalyzer {
    builtins: HashSet<String>,
}

impl UndefinedNameAnalyzer {
    pub fn new<P: BuiltinSymbolProvider + ?Sized>(provider: &P) -> Self {
        Self::with_builtins(provider.builtin_names())
    }

    pub fn with_builtins(builtins: HashSet<String>) -> Self {
        Self { builtins }
    }

    /// Undefined names of a parsed module, sorted.
    pub fn find_undefined_names(&self, suite: &[Stmt]) -> Vec<String> {
        let collector = NameCollector::collect(suite);
        let mut names: Vec<String> = collector
            .unbound_uses()
            .filter(|name| !self.builtins.contains(*name) && !is_dunder(name))
            .map(String::from)
            .collect();
        names.sort();
        names
    }
}

impl Default for UndefinedNameAnalyzer {
    fn default() -> Self {
        Self::new(&EmbeddedBuiltins)
    }
}

impl NameCheck for UndefinedNameAnalyzer {
    fn check(&self, file_path: &str, source: &str) -> Option<Diagnostic> {
        let suite = match parse_python_source(source, file_path) {
            Ok(suite) => suite,
            Err(err) => {
                debug!(
                    "{}: skipping name analysis, parse failed at line {}",
                    file_path, err.position.line
                );
                return None;
            }
        };

        let names = self.find_undefined_names(&suite);
        if names.is_empty() {
            return None;
        }

        debug!("{}: {} undefined name(s)", file_path, names.len());
        Some(UndefinedNamesIssue::new(file_path, names).into())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::issues::{Line, Report, Rule};

    fn check(source: &str) -> Option<Diagnostic> {
        UndefinedNameAnalyzer::default().check("app.py", source)
    }

    #[test]
    fn test_parameters_and_loop_targets_stay_unbound() {
        let source = r#"
import os
from pathlib import Path

ROOT = Path(os.getcwd())

def show(items):
    for item in sorted(items):
        print(len(item), ROOT)

show(["a", "b"])
"#;
        // `items` and `item` are parameter / loop targets, which never bind.
        let diagnostic = check(source).unwrap();
        assert_eq!(diagnostic.message(), "Undefined names: item, items");
    }

    #[test]
    fn test_clean_module() {
        let source = "import sys\n\ndef main():\n    print(sys.argv)\n\nmain()\n";
        assert_eq!(check(source), None);
    }

    #[test]
    fn test_undeclared_call_is_reported() {
        let diagnostic = check("def greet():\n    pass\n\ngreat()\n").unwrap();

        assert_eq!(diagnostic.report_rule(), Rule::UndefinedName);
        assert_eq!(diagnostic.line(), Line::Unknown);
        assert_eq!(diagnostic.file_path(), "app.py");
        assert_eq!(diagnostic.message(), "Undefined names: great");
    }

    #[test]
    fn test_all_undefined_names_in_one_diagnostic() {
        let diagnostic = check("lprint(datta)\nlprint(config)\n").unwrap();
        assert_eq!(diagnostic.message(), "Undefined names: config, datta, lprint");
    }

    #[test]
    fn test_dunder_names_are_ignored() {
        assert_eq!(check("print(__file__, __custom_magic__)\n"), None);
    }

    #[test]
    fn test_imports_only() {
        assert_eq!(check("import os\nimport sys as system\nfrom json import *\n"), None);
    }

    #[test]
    fn test_empty_module() {
        assert_eq!(check(""), None);
    }

    #[test]
    fn test_binding_anywhere_counts() {
        // Bound after use, and inside a branch: both count.
        let source = "print(later)\nif False:\n    later = 1\n";
        assert_eq!(check(source), None);
    }

    #[test]
    fn test_unparseable_source_yields_no_diagnostic() {
        assert_eq!(check("def broken(:\n"), None);
    }

    #[test]
    fn test_custom_provider() {
        struct OnlyPrint;
        impl BuiltinSymbolProvider for OnlyPrint {
            fn builtin_names(&self) -> HashSet<String> {
                HashSet::from(["print".to_string()])
            }
        }

        let analyzer = UndefinedNameAnalyzer::new(&OnlyPrint);
        let diagnostic = analyzer.check("a.py", "print(len('x'))\n").unwrap();
        assert_eq!(diagnostic.message(), "Undefined names: len");
    }

    #[test]
    fn test_is_dunder() {
        assert!(is_dunder("__name__"));
        assert!(is_dunder("__private"));
        assert!(!is_dunder("_private"));
        assert!(!is_dunder("name__"));
    }
}
