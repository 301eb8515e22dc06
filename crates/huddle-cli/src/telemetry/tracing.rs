//! Tracing subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, TelemetryConfig};

/// Initializes the tracing subscriber for structured logging on stderr.
///
/// # Configuration
///
/// The filter is read from `RUST_LOG`; when unset, the configured fallback
/// filter (`warn` by default) applies. Stdout is left to command output.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug huddle roles
/// RUST_LOG=huddle_store=trace huddle --log-format json remove --actor ... --user ...
/// ```
pub(super) fn init_tracing(config: &TelemetryConfig) -> anyhow::Result<()> {
    let env_filter = create_env_filter(&config.log_filter)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.log_format {
        LogFormat::Text => registry.with(create_fmt_layer()).try_init(),
        LogFormat::Json => registry.with(create_json_layer()).try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))
}

/// Creates an environment filter for tracing.
fn create_env_filter(fallback: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| anyhow::anyhow!("failed to create env filter: {e}"))
}

/// Creates a human-readable tracing layer.
fn create_fmt_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: ::tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
}

/// Creates a JSON tracing layer.
fn create_json_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: ::tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_current_span(false)
}
