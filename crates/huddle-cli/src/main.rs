#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use std::process;

use anyhow::Context;

use crate::command::{Outcome, Session};
use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "huddle_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "huddle_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "huddle_cli::command";

/// Exit code for configuration and I/O failures.
const EXIT_FAILURE: i32 = 2;

#[tokio::main]
async fn main() {
    let error = match run().await {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %error,
            "command terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(EXIT_FAILURE);
}

/// Main application entry point.
async fn run() -> anyhow::Result<Outcome> {
    let cli = Cli::init();

    telemetry::init_tracing(&cli.telemetry)?;
    cli.log();
    cli.validate().context("invalid configuration")?;

    let session = Session::open(cli.evaluator)
        .await
        .context("failed to load evaluator inputs")?;

    let mut stdout = std::io::stdout().lock();
    cli.command.execute(&session, &mut stdout).await
}
