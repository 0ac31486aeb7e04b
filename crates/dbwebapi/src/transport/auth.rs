//! Bearer token guard for admin routes

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;

use crate::constants::BEARER_PREFIX;

/// Bearer token authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    token: Option<Arc<str>>,
}

impl AuthConfig {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()).map(Into::into),
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Check an `Authorization` header value against the configured token
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        let Some(ref expected_token) = self.token else {
            return Ok(());
        };

        let auth_header = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match auth_header.map(|value| value.strip_prefix(BEARER_PREFIX)) {
            Some(Some(provided_token)) if provided_token == expected_token.as_ref() => Ok(()),
            Some(Some(_)) => {
                tracing::warn!("Invalid bearer token provided");
                Err(StatusCode::UNAUTHORIZED)
            }
            Some(None) => {
                tracing::warn!("Invalid Authorization header format");
                Err(StatusCode::UNAUTHORIZED)
            }
            None => {
                tracing::warn!("Missing Authorization header");
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }
}

/// Reject requests without the configured bearer token
pub async fn bearer_auth_middleware(
    State(auth): State<AuthConfig>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    auth.authorize(&headers)?;
    Ok(next.run(request).await)
}
