//! OpenTelemetry span export over OTLP

use std::sync::OnceLock;

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use super::{env_filter, log_layer};
use crate::config::TelemetryConfig;
use crate::{Error, Result};

static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

fn build_provider(config: &TelemetryConfig, endpoint: &str) -> Result<SdkTracerProvider> {
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build();

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create OTLP exporter: {e}")))?;

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Install the subscriber, exporting spans when an OTLP endpoint is set
pub fn init_telemetry(config: &TelemetryConfig) -> Result<()> {
    let otel_layer = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let provider = build_provider(config, endpoint)?;
            let tracer = provider.tracer(config.service_name.clone());
            TRACER_PROVIDER.set(provider).ok();
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(log_layer(config))
        .with(otel_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {e}")))?;

    if let Some(endpoint) = config.otlp_endpoint.as_deref() {
        tracing::info!(endpoint, service = %config.service_name, "OTLP span export enabled");
    } else {
        tracing::debug!("OTLP span export disabled");
    }

    Ok(())
}

/// Flush pending spans
pub fn shutdown_telemetry() {
    if let Some(provider) = TRACER_PROVIDER.get()
        && let Err(e) = provider.shutdown()
    {
        tracing::warn!(error = ?e, "Failed to shut down tracer provider");
    }
}
