//! SQL and protocol constants

/// SQL query to check database connection health
pub const HEALTH_CHECK_QUERY: &str = "SELECT 1 FROM DUMMY";

/// Call of the configured DDL change detection procedure
/// (use .replace("{PROC}", proc).replace("{MINUTES}", minutes))
pub const DETECT_CHANGES_TEMPLATE: &str = "CALL {PROC}({MINUTES})";

/// SQL query template to derive procedure parameters in current schema
/// (use .replace("{PROC}", `procedure_name`))
pub const PROCEDURE_PARAMETERS_CURRENT_SCHEMA: &str = "SELECT PARAMETER_NAME, DATA_TYPE_NAME, PARAMETER_TYPE, POSITION FROM SYS.PROCEDURE_PARAMETERS WHERE SCHEMA_NAME = CURRENT_SCHEMA AND PROCEDURE_NAME = '{PROC}' ORDER BY POSITION";

/// SQL query template to derive procedure parameters in a specific schema
/// (use .replace("{SCHEMA}", schema).replace("{PROC}", `procedure_name`))
pub const PROCEDURE_PARAMETERS_TEMPLATE: &str = "SELECT PARAMETER_NAME, DATA_TYPE_NAME, PARAMETER_TYPE, POSITION FROM SYS.PROCEDURE_PARAMETERS WHERE SCHEMA_NAME = '{SCHEMA}' AND PROCEDURE_NAME = '{PROC}' ORDER BY POSITION";

/// Health status: success
pub const STATUS_OK: &str = "ok";

/// Health status: database unreachable
pub const STATUS_DEGRADED: &str = "degraded";

/// Prefix of the `Authorization` header value guarding admin routes
pub const BEARER_PREFIX: &str = "Bearer ";
