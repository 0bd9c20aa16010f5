//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: Scan a project for syntax errors and undefined names
//! - `init`: Initialize pyscan configuration file

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::core::names::builtins::DEFAULT_PYTHON;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Check(cmd)) => cmd.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Cargo-style diagnostics and totals
    #[default]
    Text,
    /// The scan summary as JSON
    Json,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Project directory to scan (prompted for when omitted)
    pub path: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Python interpreter queried for the built-in names
    #[arg(long, env = "PYSCAN_PYTHON", default_value = DEFAULT_PYTHON)]
    pub python: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find syntax errors and undefined names in a Python project
    Check(CheckCommand),
    /// Initialize a new .pyscanrc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults() {
        let args = Arguments::try_parse_from(["pyscan", "check"]).unwrap();

        let Some(Command::Check(cmd)) = args.command else {
            panic!("expected check command");
        };
        assert_eq!(cmd.path, None);
        assert_eq!(cmd.format, OutputFormat::Text);
        assert!(!cmd.verbose);
    }

    #[test]
    fn test_check_with_options() {
        let args = Arguments::try_parse_from([
            "pyscan", "check", "src", "--format", "json", "--python", "python3.12", "-v",
        ])
        .unwrap();

        assert!(args.verbose());
        let Some(Command::Check(cmd)) = args.command else {
            panic!("expected check command");
        };
        assert_eq!(cmd.path.as_deref(), Some("src"));
        assert_eq!(cmd.format, OutputFormat::Json);
        assert_eq!(cmd.python, "python3.12");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Arguments::command().debug_assert();
    }
}
