use std::path::Path;

use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{check::check, init::init},
    exit_status::ExitStatus,
};

/// Dispatch a parsed command line to its command handler.
pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::Init) => init(Path::new(".")),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
