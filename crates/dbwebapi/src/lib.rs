//! Web API host for SAP HANA stored procedures

pub mod config;
mod constants;
pub mod db;
pub mod derived;
mod error;
pub mod form;
pub mod observability;
pub mod transport;
pub mod types;
mod validation;

pub use config::{
    Config, ConfigBuilder, DetectionConfig, TelemetryConfig, TransportConfig, UploadConfig,
};
pub use db::{DbContext, Pool, PooledConnection, QueryGuard, create_pool};
pub use derived::{CacheMode, CacheModeController, DerivedParametersCache, DetectionOutcome};
pub use error::{Error, Result};
pub use form::{FormData, MemoryStreamProvider, MultipartStreamProvider};
pub use transport::{AppState, build_router, run_http};
pub use types::*;
