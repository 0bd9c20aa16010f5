//! Sources for the names Python predefines in every module.

use std::{collections::HashSet, process::Command};

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};

/// Interpreter used when none is configured.
pub const DEFAULT_PYTHON: &str = "python3";

/// Prints one built-in name per line.
const QUERY_SCRIPT: &str = r"import builtins; print('\n'.join(dir(builtins)))";

/// Supplies the set of names that never need an explicit binding.
pub trait BuiltinSymbolProvider {
    fn builtin_names(&self) -> HashSet<String>;
}

/// `dir(builtins)` of CPython 3.12.
pub const EMBEDDED_BUILTINS: &[&str] = &[
    "ArithmeticError",
    "AssertionError",
    "AttributeError",
    "BaseException",
    "BaseExceptionGroup",
    "BlockingIOError",
    "BrokenPipeError",
    "BufferError",
    "BytesWarning",
    "ChildProcessError",
    "ConnectionAbortedError",
    "ConnectionError",
    "ConnectionRefusedError",
    "ConnectionResetError",
    "DeprecationWarning",
    "EOFError",
    "Ellipsis",
    "EncodingWarning",
    "EnvironmentError",
    "Exception",
    "ExceptionGroup",
    "False",
    "FileExistsError",
    "FileNotFoundError",
    "FloatingPointError",
    "FutureWarning",
    "GeneratorExit",
    "IOError",
    "ImportError",
    "ImportWarning",
    "IndentationError",
    "IndexError",
    "InterruptedError",
    "IsADirectoryError",
    "KeyError",
    "KeyboardInterrupt",
    "LookupError",
    "MemoryError",
    "ModuleNotFoundError",
    "NameError",
    "None",
    "NotADirectoryError",
    "NotImplemented",
    "NotImplementedError",
    "OSError",
    "OverflowError",
    "PendingDeprecationWarning",
    "PermissionError",
    "ProcessLookupError",
    "RecursionError",
    "ReferenceError",
    "ResourceWarning",
    "RuntimeError",
    "RuntimeWarning",
    "StopAsyncIteration",
    "StopIteration",
    "SyntaxError",
    "SyntaxWarning",
    "SystemError",
    "SystemExit",
    "TabError",
    "TimeoutError",
    "True",
    "TypeError",
    "UnboundLocalError",
    "UnicodeDecodeError",
    "UnicodeEncodeError",
    "UnicodeError",
    "UnicodeTranslateError",
    "UnicodeWarning",
    "UserWarning",
    "ValueError",
    "Warning",
    "ZeroDivisionError",
    "__build_class__",
    "__debug__",
    "__doc__",
    "__import__",
    "__loader__",
    "__name__",
    "__package__",
    "__spec__",
    "abs",
    "aiter",
    "all",
    "anext",
    "any",
    "ascii",
    "bin",
    "bool",
    "breakpoint",
    "bytearray",
    "bytes",
    "callable",
    "chr",
    "classmethod",
    "compile",
    "complex",
    "copyright",
    "credits",
    "delattr",
    "dict",
    "dir",
    "divmod",
    "enumerate",
    "eval",
    "exec",
    "exit",
    "filter",
    "float",
    "format",
    "frozenset",
    "getattr",
    "globals",
    "hasattr",
    "hash",
    "help",
    "hex",
    "id",
    "input",
    "int",
    "isinstance",
    "issubclass",
    "iter",
    "len",
    "license",
    "list",
    "locals",
    "map",
    "max",
    "memoryview",
    "min",
    "next",
    "object",
    "oct",
    "open",
    "ord",
    "pow",
    "print",
    "property",
    "quit",
    "range",
    "repr",
    "reversed",
    "round",
    "set",
    "setattr",
    "slice",
    "sorted",
    "staticmethod",
    "str",
    "sum",
    "super",
    "tuple",
    "type",
    "vars",
    "zip",
];

/// Built-in names compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedBuiltins;

impl BuiltinSymbolProvider for EmbeddedBuiltins {
    fn builtin_names(&self) -> HashSet<String> {
        EMBEDDED_BUILTINS.iter().map(|name| name.to_string()).collect()
    }
}

/// Built-in names reported by a live interpreter.
///
/// Falls back to [`EmbeddedBuiltins`] when the interpreter cannot be run.
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    program: String,
}

impl PythonRuntime {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the interpreter and read `dir(builtins)` from its output.
    pub fn query(&self) -> Result<HashSet<String>> {
        let output = Command::new(&self.program)
            .args(["-c", QUERY_SCRIPT])
            .output()
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8(output.stdout)
            .with_context(|| format!("{} printed non-UTF-8 output", self.program))?;
        let names = parse_name_list(&stdout);
        if names.is_empty() {
            bail!("{} reported no built-in names", self.program);
        }

        Ok(names)
    }
}

impl Default for PythonRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_PYTHON)
    }
}

impl BuiltinSymbolProvider for PythonRuntime {
    fn builtin_names(&self) -> HashSet<String> {
        match self.query() {
            Ok(names) => {
                debug!("Loaded {} built-in names from {}", names.len(), self.program);
                names
            }
            Err(e) => {
                warn!(
                    "Cannot query built-in names ({:#}); using the embedded CPython 3.12 list",
                    e
                );
                EmbeddedBuiltins.builtin_names()
            }
        }
    }
}

fn parse_name_list(output: &str) -> HashSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
