//! Background tasks driving the cache mode controller

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::controller::CacheModeController;

/// Spawn the self-recovery watchdog.
///
/// Every `period` it calls [`CacheModeController::self_recover`] and drops
/// expired cache entries.
pub fn spawn_self_recovery(
    controller: Arc<CacheModeController>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if controller.self_recover() {
                        tracing::debug!("Self-recovery watchdog reverted cache to idle");
                    }
                    let purged = controller.cache().purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, "Expired derived parameters dropped");
                    }
                    #[cfg(feature = "metrics")]
                    crate::observability::set_cache_size(controller.cache().len());
                }
                () = shutdown.cancelled() => {
                    tracing::debug!("Self-recovery watchdog shutting down");
                    break;
                }
            }
        }
    })
}

/// Spawn in-process change detection every `period`.
///
/// Each cycle looks back one minute more than the period so consecutive
/// windows overlap. Failures are logged and the next tick retries.
pub fn spawn_detection_schedule(
    controller: Arc<CacheModeController>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let elapsed_minutes = lookback_minutes(period);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match controller.detect_changes(elapsed_minutes).await {
                        Ok(outcome) => {
                            tracing::debug!(
                                expired = outcome.expired_count(),
                                "Scheduled change detection finished"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Scheduled change detection failed");
                        }
                    }
                }
                () = shutdown.cancelled() => {
                    tracing::debug!("Detection schedule shutting down");
                    break;
                }
            }
        }
    })
}

fn lookback_minutes(period: Duration) -> i64 {
    i64::try_from(period.as_secs().div_ceil(60))
        .unwrap_or(i64::MAX - 1)
        .saturating_add(1)
}
