//! Request and response types for the HTTP API

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::derived::{CacheMode, DerivedCacheStats};

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Round trip of `SELECT 1 FROM DUMMY` (None = database unreachable)
    pub database_latency_ms: Option<u64>,
}

/// Direction of a stored procedure parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterDirection {
    In,
    Out,
    InOut,
}

impl FromStr for ParameterDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            "INOUT" | "IN OUT" => Ok(Self::InOut),
            other => Err(format!("unknown parameter direction: {other}")),
        }
    }
}

impl fmt::Display for ParameterDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Out => write!(f, "OUT"),
            Self::InOut => write!(f, "INOUT"),
        }
    }
}

/// Stored procedure parameter metadata as derived from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureParameter {
    pub name: String,
    /// HANA data type (NVARCHAR, INTEGER, DECIMAL, TABLE, etc.)
    pub data_type: String,
    pub direction: ParameterDirection,
    pub position: u32,
}

/// Derived parameters of one procedure
#[derive(Debug, Clone, Serialize)]
pub struct ProcedureParameters {
    pub procedure: String,
    pub parameters: Vec<ProcedureParameter>,
    /// Whether the parameters were served from the cache
    pub cached: bool,
}

/// Body of `POST /admin/detect-sp-changes`
#[derive(Debug, Clone, Deserialize)]
pub struct DetectChangesRequest {
    pub elapsed_minutes: i64,
}

/// Response of `POST /admin/detect-sp-changes`
#[derive(Debug, Clone, Serialize)]
pub struct DetectChangesResponse {
    /// Number of invalidated cache entries, or -1 when detection is off
    pub expired: i64,
    pub mode: CacheMode,
}

/// Snapshot of the derived-parameters cache mode
#[derive(Debug, Clone, Serialize)]
pub struct CacheModeStatus {
    pub mode: CacheMode,
    pub detection_enabled: bool,
    pub expire_interval_secs: u64,
    /// Seconds since the last detection cycle (None = never ran)
    pub last_detection_age_secs: Option<u64>,
    pub cache: DerivedCacheStats,
}

/// One input field of a multipart form, as reported by `/form/inspect`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputFieldView {
    Text { name: String, value: String },
    Null { name: String },
    Binary { name: String, size: usize },
}
