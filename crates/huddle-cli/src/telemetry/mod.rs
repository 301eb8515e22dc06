//! Telemetry and tracing configuration.

mod tracing;

use anyhow::Context;

use crate::config::TelemetryConfig;

/// Initializes the tracing subscriber.
///
/// # Errors
///
/// Returns an error if the tracing subscriber fails to initialize.
pub(crate) fn init_tracing(config: &TelemetryConfig) -> anyhow::Result<()> {
    tracing::init_tracing(config).context("failed to initialize tracing")
}
