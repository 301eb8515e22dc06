//! Logging configuration.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::TRACING_TARGET_CONFIG;

/// Output format of log lines.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(ValueEnum, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
///
/// `RUST_LOG` always takes precedence over `--log-filter`.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct TelemetryConfig {
    /// Format of log output on stderr.
    #[arg(long, env = "HUDDLE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    #[serde(default)]
    pub log_format: LogFormat,

    /// Filter directives used when `RUST_LOG` is unset.
    #[arg(long, env = "HUDDLE_LOG_FILTER", default_value = "warn")]
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "warn".to_owned()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl TelemetryConfig {
    /// Logs the configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            log_format = %self.log_format,
            log_filter = %self.log_filter,
            "telemetry configuration"
        );
    }
}
