//! Source parsers.
//!
//! - `encoding`: raw bytes to source text (BOM, PEP 263 coding declarations)
//! - `python`: Python module parser (uses rustpython-parser for AST generation)

pub mod encoding;
pub mod python;
