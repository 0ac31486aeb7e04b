//! Derived stored procedure parameters: cache, mode controller, watchdog

mod cache;
mod clock;
mod controller;
mod mode;
mod watchdog;

pub use cache::{DerivedCacheStats, DerivedParametersCache};
#[cfg(test)]
pub(crate) use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use controller::{CacheModeController, DetectionOutcome, SpChangeDetector};
pub use mode::CacheMode;
pub use watchdog::{spawn_detection_schedule, spawn_self_recovery};
