//! Cache mode controller
//!
//! Toggles the derived-parameters cache between [`CacheMode::Idle`] and
//! [`CacheMode::Watching`]. Detection calls move the cache into watching mode
//! (long expiry, explicit invalidation of altered procedures); the watchdog
//! moves it back to idle once detection has been silent for longer than the
//! idle expiry interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::cache::DerivedParametersCache;
use super::clock::Clock;
use super::mode::CacheMode;
use crate::Result;
use crate::config::DetectionConfig;
use crate::types::CacheModeStatus;

const NEVER: u64 = u64::MAX;

/// Database side of change detection
#[async_trait]
pub trait SpChangeDetector: Send + Sync {
    /// Call `detect_proc` with `lookback` and invalidate every procedure it
    /// reports as altered, returning the number of invalidated cache entries.
    async fn invalidate_altered_sp_from_cache(
        &self,
        detect_proc: &str,
        lookback: Duration,
    ) -> Result<u64>;
}

/// Result of one [`CacheModeController::detect_changes`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// No detection procedure configured, or a lookback below one minute
    Disabled,
    /// Detection ran and invalidated this many entries
    Detected(u64),
}

impl DetectionOutcome {
    /// Wire representation: the invalidated count, or -1 when disabled
    #[must_use]
    pub fn expired_count(self) -> i64 {
        match self {
            Self::Disabled => -1,
            Self::Detected(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }
}

pub struct CacheModeController {
    mode: Mutex<CacheMode>,
    /// Clock reading of the last completed detection, `NEVER` if none
    last_detection_nanos: AtomicU64,
    config: DetectionConfig,
    cache: Arc<DerivedParametersCache>,
    detector: Arc<dyn SpChangeDetector>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CacheModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheModeController")
            .field("mode", &self.mode())
            .field("detect_proc", &self.config.detect_proc())
            .field("last_detection_age", &self.last_detection_age())
            .finish_non_exhaustive()
    }
}

impl CacheModeController {
    /// Create a controller in idle mode, applying the idle expiry interval
    pub fn new(
        config: DetectionConfig,
        cache: Arc<DerivedParametersCache>,
        detector: Arc<dyn SpChangeDetector>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        cache.set_expire_interval(config.cache_expire_interval_without_detection);

        #[cfg(feature = "metrics")]
        crate::observability::set_cache_mode(CacheMode::Idle);

        Self {
            mode: Mutex::new(CacheMode::Idle),
            last_detection_nanos: AtomicU64::new(NEVER),
            config,
            cache,
            detector,
            clock,
        }
    }

    #[must_use]
    pub fn mode(&self) -> CacheMode {
        *self.mode.lock()
    }

    #[must_use]
    pub const fn config(&self) -> &DetectionConfig {
        &self.config
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<DerivedParametersCache> {
        &self.cache
    }

    /// Time since the last completed detection cycle
    #[must_use]
    pub fn last_detection_age(&self) -> Option<Duration> {
        match self.last_detection_nanos.load(Ordering::Acquire) {
            NEVER => None,
            nanos => Some(self.clock.now().saturating_sub(Duration::from_nanos(nanos))),
        }
    }

    /// Run one detection cycle looking back `elapsed_minutes`.
    ///
    /// Without a configured detection procedure, or with a lookback below one
    /// minute, the cache drops to idle and [`DetectionOutcome::Disabled`] is
    /// returned. Database failures propagate; the mode stays watching and the
    /// watchdog eventually reverts it if detection keeps failing.
    pub async fn detect_changes(&self, elapsed_minutes: i64) -> Result<DetectionOutcome> {
        let Some(detect_proc) = self.config.detect_proc().filter(|_| elapsed_minutes >= 1) else {
            self.switch_mode(CacheMode::Idle);
            return Ok(DetectionOutcome::Disabled);
        };

        self.switch_mode(CacheMode::Watching);

        let minutes = u64::try_from(elapsed_minutes).unwrap_or_default();
        let lookback = Duration::from_secs(minutes.saturating_mul(60));
        let invalidated = self
            .detector
            .invalidate_altered_sp_from_cache(detect_proc, lookback)
            .await?;

        let now = u64::try_from(self.clock.now().as_nanos()).unwrap_or(NEVER - 1);
        self.last_detection_nanos.store(now, Ordering::Release);

        debug!(
            detect_proc,
            elapsed_minutes, invalidated, "Stored procedure change detection completed"
        );

        #[cfg(feature = "metrics")]
        crate::observability::record_detection(invalidated);

        Ok(DetectionOutcome::Detected(invalidated))
    }

    /// Revert to idle mode if watching and detection has been silent for
    /// longer than the idle expiry interval. Returns `true` on reversion.
    pub fn self_recover(&self) -> bool {
        let threshold = self.config.cache_expire_interval_without_detection;
        if threshold.is_zero() {
            return false;
        }

        let mut mode = self.mode.lock();
        if !mode.is_watching() {
            return false;
        }

        let stale = self.last_detection_age().is_none_or(|age| age > threshold);
        if !stale {
            return false;
        }

        self.apply_mode(&mut mode, CacheMode::Idle);
        drop(mode);

        warn!(
            threshold_secs = threshold.as_secs(),
            "No change detection within threshold, cache reverted to idle"
        );

        #[cfg(feature = "metrics")]
        crate::observability::record_self_recovery();

        true
    }

    #[must_use]
    pub fn status(&self) -> CacheModeStatus {
        CacheModeStatus {
            mode: self.mode(),
            detection_enabled: self.config.is_detection_enabled(),
            expire_interval_secs: self.cache.expire_interval().as_secs(),
            last_detection_age_secs: self.last_detection_age().map(|age| age.as_secs()),
            cache: self.cache.stats(),
        }
    }

    fn switch_mode(&self, target: CacheMode) -> bool {
        let mut mode = self.mode.lock();
        if *mode == target {
            return false;
        }
        self.apply_mode(&mut mode, target);
        true
    }

    fn apply_mode(&self, mode: &mut CacheMode, target: CacheMode) {
        let interval = match target {
            CacheMode::Idle => self.config.cache_expire_interval_without_detection,
            CacheMode::Watching => self.config.cache_expire_interval_with_detection,
        };
        *mode = target;
        self.cache.set_expire_interval(interval);

        info!(
            mode = %target,
            expire_interval_secs = interval.as_secs(),
            "Derived parameters cache mode switched"
        );

        #[cfg(feature = "metrics")]
        crate::observability::set_cache_mode(target);
    }
}
