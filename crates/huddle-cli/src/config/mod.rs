//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── evaluator: EvaluatorConfig  # Member snapshot, role defaults, project
//! ├── telemetry: TelemetryConfig  # Log format and fallback filter
//! └── command: Command            # What to evaluate or apply
//! ```
//!
//! Every option can be provided as an argument or through its `HUDDLE_*`
//! environment variable.

mod evaluator;
mod telemetry;

use std::process;

use anyhow::Context;
use clap::Parser;
pub use evaluator::EvaluatorConfig;
pub use telemetry::{LogFormat, TelemetryConfig};

use crate::TRACING_TARGET_STARTUP;
use crate::command::Command;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "huddle")]
#[command(about = "Evaluate Huddle project roles, permissions and membership changes")]
#[command(version)]
pub struct Cli {
    /// Member snapshot and rule configuration.
    #[clap(flatten)]
    pub evaluator: EvaluatorConfig,

    /// Logging configuration.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from a `.env` file (if enabled) and parses
    /// the command line.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.evaluator
            .validate()
            .context("invalid evaluator configuration")?;

        if self.command.needs_members() && self.evaluator.members.is_none() {
            anyhow::bail!("`{}` requires a member snapshot (--members)", self.command.name());
        }

        Ok(())
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?enabled_features(),
            command = self.command.name(),
            "build information"
        );

        self.evaluator.log();
        self.telemetry.log();
    }
}

/// Returns a list of enabled compile-time features.
fn enabled_features() -> Vec<&'static str> {
    [cfg!(feature = "dotenv").then_some("dotenv")]
        .into_iter()
        .flatten()
        .collect()
}
