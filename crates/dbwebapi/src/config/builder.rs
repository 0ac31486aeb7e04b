//! Configuration builder

use std::net::IpAddr;
use std::num::NonZeroUsize;
use std::time::Duration;

use url::Url;

use super::detection::DetectionConfig;
use crate::Error;
use crate::validation::validate_procedure_name;

/// Default request body limit for multipart uploads: 32MB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub connection_url: Url,
    pub pool_size: NonZeroUsize,
    pub query_timeout: Duration,
    pub transport: TransportConfig,
    pub telemetry: TelemetryConfig,
    pub detection: DetectionConfig,
    pub upload: UploadConfig,
}

impl Config {
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    #[must_use]
    pub const fn detection(&self) -> &DetectionConfig {
        &self.detection
    }

    #[must_use]
    pub const fn upload(&self) -> &UploadConfig {
        &self.upload
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub http_host: IpAddr,
    pub http_port: u16,
    /// Bearer token guarding `/admin` routes (None = open)
    pub bearer_token: Option<String>,
    pub cors_origin: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            http_host: IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            http_port: 8080,
            bearer_token: None,
            cors_origin: None,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
    pub log_level: String,
    pub json_logs: bool,
}

/// Multipart upload limits
#[derive(Debug, Clone, Copy)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Configuration builder with fluent API
#[derive(Debug)]
pub struct ConfigBuilder {
    connection_url: Option<Url>,
    pool_size: NonZeroUsize,
    query_timeout: Duration,
    transport: TransportConfig,
    telemetry: TelemetryConfig,
    detection: DetectionConfig,
    upload: UploadConfig,
}

impl ConfigBuilder {
    const DEFAULT_POOL_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(3); // 4

    #[must_use]
    pub const fn new() -> Self {
        Self {
            connection_url: None,
            pool_size: Self::DEFAULT_POOL_SIZE,
            query_timeout: Duration::from_secs(30),
            transport: TransportConfig {
                http_host: IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                http_port: 8080,
                bearer_token: None,
                cors_origin: None,
            },
            telemetry: TelemetryConfig {
                otlp_endpoint: None,
                service_name: String::new(),
                log_level: String::new(),
                json_logs: false,
            },
            detection: DetectionConfig::new(),
            upload: UploadConfig {
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        }
    }

    #[must_use]
    pub fn connection_url(mut self, url: Url) -> Self {
        self.connection_url = Some(url);
        self
    }

    #[must_use]
    pub const fn pool_size(mut self, size: NonZeroUsize) -> Self {
        self.pool_size = size;
        self
    }

    #[must_use]
    pub const fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn http_host(mut self, host: IpAddr) -> Self {
        self.transport.http_host = host;
        self
    }

    #[must_use]
    pub const fn http_port(mut self, port: u16) -> Self {
        self.transport.http_port = port;
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: Option<String>) -> Self {
        self.transport.bearer_token = token;
        self
    }

    #[must_use]
    pub fn cors_origin(mut self, origin: Option<String>) -> Self {
        self.transport.cors_origin = origin;
        self
    }

    #[must_use]
    pub fn otlp_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.telemetry.otlp_endpoint = endpoint;
        self
    }

    #[must_use]
    pub fn service_name(mut self, name: String) -> Self {
        self.telemetry.service_name = name;
        self
    }

    #[must_use]
    pub fn log_level(mut self, level: String) -> Self {
        self.telemetry.log_level = level;
        self
    }

    #[must_use]
    pub const fn json_logs(mut self, enabled: bool) -> Self {
        self.telemetry.json_logs = enabled;
        self
    }

    // Detection configuration methods

    /// Set the DDL change detection procedure (None disables detection)
    #[must_use]
    pub fn detect_ddl_changes_proc(mut self, proc_name: Option<String>) -> Self {
        self.detection.detect_ddl_changes_proc = proc_name;
        self
    }

    #[must_use]
    pub const fn cache_expire_interval_with_detection(mut self, interval: Duration) -> Self {
        self.detection.cache_expire_interval_with_detection = interval;
        self
    }

    #[must_use]
    pub const fn cache_expire_interval_without_detection(mut self, interval: Duration) -> Self {
        self.detection.cache_expire_interval_without_detection = interval;
        self
    }

    #[must_use]
    pub const fn self_recover_interval(mut self, interval: Duration) -> Self {
        self.detection.self_recover_interval = interval;
        self
    }

    /// Run detection in-process every `period`
    #[must_use]
    pub const fn detect_schedule(mut self, period: Option<Duration>) -> Self {
        self.detection.schedule = period;
        self
    }

    /// Run detection every `minutes`; zero disables the schedule
    #[must_use]
    pub const fn detect_schedule_minutes(self, minutes: u64) -> Self {
        let period = if minutes == 0 {
            None
        } else {
            Some(Duration::from_secs(minutes.saturating_mul(60)))
        };
        self.detect_schedule(period)
    }

    #[must_use]
    pub const fn max_upload_bytes(mut self, max: usize) -> Self {
        self.upload.max_upload_bytes = max;
        self
    }

    /// Build the configuration
    pub fn build(self) -> crate::Result<Config> {
        let connection_url = self
            .connection_url
            .ok_or_else(|| Error::Config("connection_url is required".into()))?;

        // Apply defaults for telemetry
        let service_name = if self.telemetry.service_name.is_empty() {
            "dbwebapi".to_string()
        } else {
            self.telemetry.service_name
        };

        let log_level = if self.telemetry.log_level.is_empty() {
            "info".to_string()
        } else {
            self.telemetry.log_level
        };

        let mut detection = self.detection;
        detection.detect_ddl_changes_proc = detection.detect_proc().map(str::to_string);
        if let Some(proc_name) = detection.detect_proc() {
            validate_procedure_name(proc_name)
                .map_err(|e| Error::Config(format!("detect_ddl_changes_proc: {e}")))?;
        }

        if detection.self_recover_interval.is_zero() {
            return Err(Error::Config(
                "self_recover_interval must be greater than zero".into(),
            ));
        }

        if detection.schedule.is_some_and(|p| p < Duration::from_secs(60)) {
            return Err(Error::Config(
                "detection schedule must be at least one minute".into(),
            ));
        }

        Ok(Config {
            connection_url,
            pool_size: self.pool_size,
            query_timeout: self.query_timeout,
            transport: self.transport,
            telemetry: TelemetryConfig {
                otlp_endpoint: self.telemetry.otlp_endpoint,
                service_name,
                log_level,
                json_logs: self.telemetry.json_logs,
            },
            detection,
            upload: self.upload,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
