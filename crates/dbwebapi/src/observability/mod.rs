//! Logging, optional Prometheus metrics and optional OTLP tracing

#[cfg(feature = "metrics")]
mod metrics;

#[cfg(feature = "telemetry")]
mod telemetry;

#[cfg(feature = "metrics")]
pub use metrics::{
    init_metrics, record_detection, record_query, record_query_error, record_request,
    record_self_recovery, record_upload, render_metrics, set_cache_mode, set_cache_size,
};
#[cfg(feature = "telemetry")]
pub use telemetry::init_telemetry;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

use crate::Result;
use crate::config::TelemetryConfig;

/// Install the tracing subscriber and, when enabled, the metrics recorder
pub fn init_observability(config: &TelemetryConfig) -> Result<()> {
    #[cfg(feature = "metrics")]
    init_metrics()?;

    #[cfg(feature = "telemetry")]
    init_telemetry(config)?;

    #[cfg(not(feature = "telemetry"))]
    init_logging(config)?;

    Ok(())
}

#[cfg(not(feature = "telemetry"))]
fn init_logging(config: &TelemetryConfig) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(log_layer(config))
        .try_init()
        .map_err(|e| crate::Error::Config(format!("Failed to install tracing subscriber: {e}")))
}

/// `RUST_LOG` wins over the configured level
fn env_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Human-readable or JSON log lines on stderr
fn log_layer<S>(config: &TelemetryConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if config.json_logs {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

/// Flush exporters before exit
#[allow(clippy::missing_const_for_fn)]
pub fn shutdown_observability() {
    #[cfg(feature = "telemetry")]
    telemetry::shutdown_telemetry();
}
