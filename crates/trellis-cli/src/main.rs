//! Trellis CLI
//!
//! Main entry point for the `trellis` binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use trellis_common_log::{LogConfig, LogFormat, LogLevel};

mod cli;
mod commands;
mod error;

use cli::Cli;
use error::Exit;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if cli.verbose > 0 {
        log_config.level = LogLevel::from_verbosity(cli.verbose);
    }
    log_config.format = LogFormat::parse(&cli.log_format);
    if let Err(e) = trellis_common_log::init(log_config) {
        eprintln!("{e}");
    }

    match cli.execute() {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e}");
            e.exit_code().into()
        }
    }
}
