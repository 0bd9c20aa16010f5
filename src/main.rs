use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use pyscan::cli::{Arguments, ExitStatus};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Overrides the log filter, e.g. `PYSCAN_LOG=pyscan=trace`.
const LOG_ENV: &str = "PYSCAN_LOG";

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,pyscan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.verbose());

    match pyscan::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("{} {:#}", "error:".bold().red(), err);
            ExitStatus::Error.into()
        }
    }
}
