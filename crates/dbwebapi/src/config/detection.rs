//! DDL change detection configuration

use std::time::Duration;

/// Default cache expiry while a detection job is actively polling (24h)
const DEFAULT_EXPIRE_WITH_DETECTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Default cache expiry without detection (10 min)
const DEFAULT_EXPIRE_WITHOUT_DETECTION: Duration = Duration::from_secs(10 * 60);

/// Default watchdog period for self-recovery checks
const DEFAULT_SELF_RECOVER_INTERVAL: Duration = Duration::from_secs(60);

/// Settings that drive the derived-parameters cache mode.
///
/// While a detection procedure is configured and called regularly, altered
/// procedures are invalidated explicitly, so cached parameters can live for
/// `cache_expire_interval_with_detection`. Without detection the cache falls
/// back to the shorter `cache_expire_interval_without_detection`, which also
/// doubles as the staleness threshold for self-recovery.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Stored procedure returning names of procedures altered within a
    /// lookback window (in minutes). `None` disables detection.
    pub detect_ddl_changes_proc: Option<String>,
    pub cache_expire_interval_with_detection: Duration,
    pub cache_expire_interval_without_detection: Duration,
    /// How often the watchdog calls `self_recover`
    pub self_recover_interval: Duration,
    /// Run detection in-process on this period instead of waiting for an
    /// external job to call the admin endpoint.
    pub schedule: Option<Duration>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            detect_ddl_changes_proc: None,
            cache_expire_interval_with_detection: DEFAULT_EXPIRE_WITH_DETECTION,
            cache_expire_interval_without_detection: DEFAULT_EXPIRE_WITHOUT_DETECTION,
            self_recover_interval: DEFAULT_SELF_RECOVER_INTERVAL,
            schedule: None,
        }
    }

    /// Configured detection procedure, ignoring blank values
    #[must_use]
    pub fn detect_proc(&self) -> Option<&str> {
        self.detect_ddl_changes_proc
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn is_detection_enabled(&self) -> bool {
        self.detect_proc().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_config_default() {
        let config = DetectionConfig::default();
        assert!(config.detect_ddl_changes_proc.is_none());
        assert!(!config.is_detection_enabled());
        assert_eq!(
            config.cache_expire_interval_with_detection,
            Duration::from_secs(86_400)
        );
        assert_eq!(
            config.cache_expire_interval_without_detection,
            Duration::from_secs(600)
        );
        assert_eq!(config.self_recover_interval, Duration::from_secs(60));
        assert!(config.schedule.is_none());
    }

    #[test]
    fn test_blank_proc_is_disabled() {
        let config = DetectionConfig {
            detect_ddl_changes_proc: Some("   ".to_string()),
            ..DetectionConfig::new()
        };
        assert!(config.detect_proc().is_none());
        assert!(!config.is_detection_enabled());
    }

    #[test]
    fn test_proc_is_trimmed() {
        let config = DetectionConfig {
            detect_ddl_changes_proc: Some(" ADMIN.DETECT_DDL_CHANGES ".to_string()),
            ..DetectionConfig::new()
        };
        assert_eq!(config.detect_proc(), Some("ADMIN.DETECT_DDL_CHANGES"));
        assert!(config.is_detection_enabled());
    }
}
