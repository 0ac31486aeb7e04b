use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(#[from] hdbconnect::HdbError),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Query timeout after {0:?}")]
    QueryTimeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid procedure name: {0}")]
    InvalidProcedureName(String),

    /// A required argument was absent. Raised for malformed multipart parts.
    #[error("Value cannot be null: {0}")]
    InvalidArgument(&'static str),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },
}

impl Error {
    #[must_use]
    pub const fn is_argument_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::QueryTimeout(_))
    }

    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    #[must_use]
    pub const fn is_pool_exhausted(&self) -> bool {
        matches!(self, Self::PoolExhausted)
    }

    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Errors caused by the request itself rather than the server
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_)
                | Self::InvalidProcedureName(_)
                | Self::Multipart(_)
                | Self::PayloadTooLarge { .. }
        )
    }

    /// Short label for logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        if self.is_timeout() {
            "timeout"
        } else if self.is_pool_exhausted() {
            "pool_exhausted"
        } else if self.is_query() {
            "query"
        } else if self.is_transport() {
            "transport"
        } else if self.is_config() {
            "config"
        } else if self.is_argument_error() {
            "argument"
        } else if self.is_client_error() {
            "client"
        } else {
            "connection"
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::InvalidProcedureName(_) | Self::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::QueryTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::PoolExhausted => StatusCode::SERVICE_UNAVAILABLE,
            Self::Connection(_) | Self::Query(_) | Self::Config(_) | Self::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Convert our Error type to an HTTP response with a JSON body
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        } else {
            tracing::error!(
                status = status.as_u16(),
                kind = self.kind(),
                error = %self,
                "Request failed"
            );
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
