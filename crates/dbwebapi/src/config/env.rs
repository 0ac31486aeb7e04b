//! Environment variable loading for configuration

use std::env;
use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::time::Duration;

use url::Url;

use super::builder::ConfigBuilder;
use crate::Result;

/// Environment variable names
mod vars {
    pub const HANA_URL: &str = "HANA_URL";
    pub const HANA_USER: &str = "HANA_USER";
    pub const HANA_PASSWORD: &str = "HANA_PASSWORD";
    pub const HANA_POOL_SIZE: &str = "HANA_POOL_SIZE";
    pub const QUERY_TIMEOUT_SECS: &str = "DBWEBAPI_QUERY_TIMEOUT_SECS";
    pub const HTTP_HOST: &str = "DBWEBAPI_HTTP_HOST";
    pub const HTTP_PORT: &str = "DBWEBAPI_HTTP_PORT";
    pub const BEARER_TOKEN: &str = "DBWEBAPI_BEARER_TOKEN";
    pub const CORS_ORIGIN: &str = "DBWEBAPI_CORS_ORIGIN";
    pub const DETECT_DDL_CHANGES_PROC: &str = "DBWEBAPI_DETECT_DDL_CHANGES_PROC";
    pub const CACHE_EXPIRE_WITH_DETECTION_SECS: &str =
        "DBWEBAPI_CACHE_EXPIRE_WITH_DETECTION_SECS";
    pub const CACHE_EXPIRE_WITHOUT_DETECTION_SECS: &str =
        "DBWEBAPI_CACHE_EXPIRE_WITHOUT_DETECTION_SECS";
    pub const SELF_RECOVER_INTERVAL_SECS: &str = "DBWEBAPI_SELF_RECOVER_INTERVAL_SECS";
    pub const DETECT_SCHEDULE_MINUTES: &str = "DBWEBAPI_DETECT_SCHEDULE_MINUTES";
    pub const MAX_UPLOAD_BYTES: &str = "DBWEBAPI_MAX_UPLOAD_BYTES";
    pub const OTEL_EXPORTER_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";
    pub const OTEL_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";
    pub const RUST_LOG: &str = "RUST_LOG";
    pub const JSON_LOGS: &str = "DBWEBAPI_JSON_LOGS";
}

/// Load configuration from environment variables
pub fn load_from_env(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    // Connection URL
    if let Ok(url_str) = env::var(vars::HANA_URL) {
        let mut url = Url::parse(&url_str)
            .map_err(|e| crate::Error::Config(format!("Invalid {}: {}", vars::HANA_URL, e)))?;

        // Optionally override user/password from separate env vars
        if let Ok(user) = env::var(vars::HANA_USER) {
            url.set_username(&user)
                .map_err(|()| crate::Error::Config("Failed to set username in URL".into()))?;
        }
        if let Ok(password) = env::var(vars::HANA_PASSWORD) {
            url.set_password(Some(&password))
                .map_err(|()| crate::Error::Config("Failed to set password in URL".into()))?;
        }

        builder = builder.connection_url(url);
    }

    if let Ok(size_str) = env::var(vars::HANA_POOL_SIZE)
        && let Ok(size) = size_str.parse::<usize>()
        && let Some(nz) = NonZeroUsize::new(size)
    {
        builder = builder.pool_size(nz);
    }

    if let Some(secs) = parse_var::<u64>(vars::QUERY_TIMEOUT_SECS) {
        builder = builder.query_timeout(Duration::from_secs(secs));
    }

    // Transport
    if let Some(host) = parse_var::<IpAddr>(vars::HTTP_HOST) {
        builder = builder.http_host(host);
    }

    if let Some(port) = parse_var::<u16>(vars::HTTP_PORT) {
        builder = builder.http_port(port);
    }

    if let Ok(token) = env::var(vars::BEARER_TOKEN) {
        builder = builder.bearer_token(Some(token).filter(|t| !t.is_empty()));
    }

    if let Ok(origin) = env::var(vars::CORS_ORIGIN) {
        builder = builder.cors_origin(Some(origin));
    }

    // Detection. An empty procedure name explicitly disables detection.
    if let Ok(proc_name) = env::var(vars::DETECT_DDL_CHANGES_PROC) {
        builder = builder.detect_ddl_changes_proc(Some(proc_name));
    }

    if let Some(secs) = parse_var::<u64>(vars::CACHE_EXPIRE_WITH_DETECTION_SECS) {
        builder = builder.cache_expire_interval_with_detection(Duration::from_secs(secs));
    }

    if let Some(secs) = parse_var::<u64>(vars::CACHE_EXPIRE_WITHOUT_DETECTION_SECS) {
        builder = builder.cache_expire_interval_without_detection(Duration::from_secs(secs));
    }

    if let Some(secs) = parse_var::<u64>(vars::SELF_RECOVER_INTERVAL_SECS) {
        builder = builder.self_recover_interval(Duration::from_secs(secs));
    }

    if let Some(minutes) = parse_var::<u64>(vars::DETECT_SCHEDULE_MINUTES) {
        builder = builder.detect_schedule_minutes(minutes);
    }

    if let Some(max) = parse_var::<usize>(vars::MAX_UPLOAD_BYTES) {
        builder = builder.max_upload_bytes(max);
    }

    // Telemetry
    if let Ok(endpoint) = env::var(vars::OTEL_EXPORTER_OTLP_ENDPOINT) {
        builder = builder.otlp_endpoint(Some(endpoint));
    }

    if let Ok(name) = env::var(vars::OTEL_SERVICE_NAME) {
        builder = builder.service_name(name);
    }

    if let Ok(level) = env::var(vars::RUST_LOG) {
        builder = builder.log_level(level);
    }

    if let Ok(val) = env::var(vars::JSON_LOGS) {
        builder = builder.json_logs(parse_bool(&val));
    }

    Ok(builder)
}

/// Read and parse a variable, ignoring unset or malformed values
fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
