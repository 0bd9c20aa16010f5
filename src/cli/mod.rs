//! Command-line shell around the analysis engine.

pub mod args;
mod commands;
mod exit_status;
mod input;
mod report;
mod run;

use anyhow::Result;

pub use args::{Arguments, Command, OutputFormat};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    run::run(args)
}
