//! HTTP transport
//!
//! Public routes serve health, parameter derivation and form inspection.
//! Cache administration lives under `/admin` behind an optional bearer token.

mod auth;
mod http;

pub use auth::{AuthConfig, bearer_auth_middleware};
pub use http::{AppState, build_router, cancel_on_signal, run_http};
