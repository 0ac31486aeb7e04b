//! Prometheus metrics for dbwebapi

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::Result;
use crate::derived::CacheMode;
use crate::error::Error;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static START_TIME: OnceLock<Instant> = OnceLock::new();

// Server metrics
const METRIC_UPTIME: &str = "dbwebapi_uptime_seconds";
const METRIC_INFO: &str = "dbwebapi_info";
const METRIC_REQUESTS: &str = "dbwebapi_requests_total";

// Query metrics
const METRIC_QUERY_DURATION: &str = "dbwebapi_query_duration_seconds";
const METRIC_QUERY_ERRORS: &str = "dbwebapi_query_errors_total";

// Derived-parameters cache metrics
const METRIC_CACHE_MODE: &str = "dbwebapi_cache_watching";
const METRIC_CACHE_SIZE: &str = "dbwebapi_derived_cache_size";
const METRIC_DETECTIONS: &str = "dbwebapi_sp_change_detections_total";
const METRIC_INVALIDATIONS: &str = "dbwebapi_sp_invalidations_total";
const METRIC_SELF_RECOVERIES: &str = "dbwebapi_cache_self_recoveries_total";

// Upload metrics
const METRIC_UPLOAD_BYTES: &str = "dbwebapi_upload_bytes";

/// Initialize Prometheus metrics recorder.
pub fn init_metrics() -> Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::Config(format!("Failed to install metrics recorder: {e}")))?;

    PROMETHEUS_HANDLE.set(handle).ok();
    START_TIME.set(Instant::now()).ok();

    register_metrics();
    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

fn register_metrics() {
    describe_gauge!(METRIC_UPTIME, "Server uptime in seconds");
    describe_gauge!(METRIC_INFO, "Server information (always 1)");
    describe_counter!(METRIC_REQUESTS, "Total HTTP requests processed");

    describe_histogram!(METRIC_QUERY_DURATION, "Database call duration in seconds");
    describe_counter!(METRIC_QUERY_ERRORS, "Total database call errors");

    describe_gauge!(
        METRIC_CACHE_MODE,
        "1 while the derived-parameters cache is watching for DDL changes"
    );
    describe_gauge!(METRIC_CACHE_SIZE, "Cached procedures (entries)");
    describe_counter!(METRIC_DETECTIONS, "Stored procedure change detection cycles");
    describe_counter!(
        METRIC_INVALIDATIONS,
        "Cache entries invalidated by change detection"
    );
    describe_counter!(
        METRIC_SELF_RECOVERIES,
        "Fallbacks to idle mode after detection went silent"
    );

    describe_histogram!(METRIC_UPLOAD_BYTES, "Size of uploaded multipart files");

    gauge!(
        METRIC_INFO,
        "version" => env!("CARGO_PKG_VERSION"),
    )
    .set(1.0);
}

/// Render metrics in Prometheus text format.
#[must_use]
pub fn render_metrics() -> String {
    if let Some(start) = START_TIME.get() {
        gauge!(METRIC_UPTIME).set(start.elapsed().as_secs_f64());
    }

    PROMETHEUS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Record a processed HTTP request by matched route and status.
pub fn record_request(endpoint: String, status: u16) {
    counter!(
        METRIC_REQUESTS,
        "endpoint" => endpoint,
        "status" => status.to_string(),
    )
    .increment(1);
}

/// Record the duration of a database call.
pub fn record_query(operation: &'static str, duration: Duration) {
    histogram!(METRIC_QUERY_DURATION, "operation" => operation).record(duration.as_secs_f64());
}

/// Record a failed database call.
pub fn record_query_error(operation: &'static str, error_type: &'static str) {
    counter!(
        METRIC_QUERY_ERRORS,
        "operation" => operation,
        "error_type" => error_type,
    )
    .increment(1);
}

/// Update the cache mode gauge.
pub fn set_cache_mode(mode: CacheMode) {
    gauge!(METRIC_CACHE_MODE).set(if mode.is_watching() { 1.0 } else { 0.0 });
}

/// Update the derived-parameters cache size gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_cache_size(size: usize) {
    gauge!(METRIC_CACHE_SIZE).set(size as f64);
}

/// Record a completed detection cycle and the entries it invalidated.
pub fn record_detection(invalidated: u64) {
    counter!(METRIC_DETECTIONS).increment(1);
    counter!(METRIC_INVALIDATIONS).increment(invalidated);
}

/// Record a watchdog fallback to idle mode.
pub fn record_self_recovery() {
    counter!(METRIC_SELF_RECOVERIES).increment(1);
}

/// Record the size of one uploaded file.
#[allow(clippy::cast_precision_loss)]
pub fn record_upload(bytes: usize) {
    histogram!(METRIC_UPLOAD_BYTES).record(bytes as f64);
}
