//! pyscan - syntax and undefined-name inspector for Python projects
//!
//! pyscan walks a directory tree, counts the lines of every `.py` file, reports
//! the first syntax error of each file, and lists the names a file reads
//! without ever binding or importing them (typos like `pritn`).
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Analysis engine (discovery, validation, name analysis, scan)
//! - `issues`: Diagnostic type definitions and reporting

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
