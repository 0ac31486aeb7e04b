//! Database context: change detection and parameter derivation

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hdbconnect_async::HdbValue;

use super::guard::QueryGuard;
use super::pool::{Pool, get_connection};
use crate::constants::{
    DETECT_CHANGES_TEMPLATE, HEALTH_CHECK_QUERY, PROCEDURE_PARAMETERS_CURRENT_SCHEMA,
    PROCEDURE_PARAMETERS_TEMPLATE,
};
use crate::derived::{DerivedParametersCache, SpChangeDetector};
use crate::types::{ParameterDirection, ProcedureParameter, ProcedureParameters};
use crate::validation::{parse_qualified_name, validate_procedure_name};
use crate::{Error, Result};

/// Shared database access for request handlers and background tasks
#[derive(Clone)]
pub struct DbContext {
    pool: Arc<Pool>,
    guard: QueryGuard,
    cache: Arc<DerivedParametersCache>,
}

impl std::fmt::Debug for DbContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbContext")
            .field("pool", &"<Pool>")
            .field("guard", &self.guard)
            .field("cache", &self.cache)
            .finish()
    }
}

impl DbContext {
    pub fn new(pool: Pool, query_timeout: Duration, cache: Arc<DerivedParametersCache>) -> Self {
        Self {
            pool: Arc::new(pool),
            guard: QueryGuard::new(query_timeout),
            cache,
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<DerivedParametersCache> {
        &self.cache
    }

    /// Round trip to the database
    pub async fn ping(&self) -> Result<Duration> {
        let start = Instant::now();
        let conn = get_connection(&self.pool).await?;
        self.guard.execute(conn.query(HEALTH_CHECK_QUERY)).await?;
        Ok(start.elapsed())
    }

    /// Parameters of `procedure`, served from the derived-parameters cache
    /// when present and fresh
    pub async fn derive_parameters(&self, procedure: &str) -> Result<ProcedureParameters> {
        let procedure = procedure.trim();
        validate_procedure_name(procedure)?;

        if let Some(parameters) = self.cache.get(procedure) {
            tracing::debug!(procedure, "Derived parameters served from cache");
            return Ok(ProcedureParameters {
                procedure: procedure.to_string(),
                parameters: parameters.to_vec(),
                cached: true,
            });
        }

        let start = Instant::now();
        let result = self.fetch_parameters(procedure).await;
        record_call("derive_parameters", start, result.as_ref().err());
        let parameters = result?;

        if parameters.is_empty() {
            return Err(Error::InvalidProcedureName(format!(
                "procedure not found: {procedure}"
            )));
        }

        tracing::debug!(
            procedure,
            count = parameters.len(),
            "Derived parameters loaded"
        );

        let parameters = self.cache.insert(procedure, parameters);
        Ok(ProcedureParameters {
            procedure: procedure.to_string(),
            parameters: parameters.to_vec(),
            cached: false,
        })
    }

    /// Names of procedures the detection procedure reports as altered
    /// within `lookback`
    pub async fn altered_procedures(
        &self,
        detect_proc: &str,
        lookback: Duration,
    ) -> Result<Vec<String>> {
        validate_procedure_name(detect_proc)?;
        let sql = detect_changes_sql(detect_proc, lookback);

        let start = Instant::now();
        let result = self.call_detection(&sql).await;
        record_call("detect_changes", start, result.as_ref().err());
        result
    }

    async fn fetch_parameters(&self, procedure: &str) -> Result<Vec<ProcedureParameter>> {
        let conn = get_connection(&self.pool).await?;
        let sql = procedure_parameters_sql(procedure);

        let result_set = self.guard.execute(conn.query(&sql)).await?;
        let rows = self.guard.execute(result_set.into_rows()).await?;

        Ok(rows
            .into_iter()
            .filter_map(|mut row| {
                parameter_from_values(
                    row.next_value(),
                    row.next_value(),
                    row.next_value(),
                    row.next_value(),
                )
            })
            .collect())
    }

    async fn call_detection(&self, sql: &str) -> Result<Vec<String>> {
        let conn = get_connection(&self.pool).await?;

        let response = self.guard.execute(conn.statement(sql)).await?;
        let result_set = response.into_result_set()?;
        let rows = self.guard.execute(result_set.into_rows()).await?;

        Ok(rows
            .into_iter()
            .filter_map(|mut row| match row.next_value() {
                Some(HdbValue::STRING(name)) if !name.trim().is_empty() => Some(name),
                _ => None,
            })
            .collect())
    }
}

#[async_trait]
impl SpChangeDetector for DbContext {
    async fn invalidate_altered_sp_from_cache(
        &self,
        detect_proc: &str,
        lookback: Duration,
    ) -> Result<u64> {
        let altered = self.altered_procedures(detect_proc, lookback).await?;
        let invalidated = self.cache.invalidate(&altered);

        tracing::debug!(
            detect_proc,
            reported = altered.len(),
            invalidated,
            "Altered procedures invalidated"
        );
        Ok(invalidated)
    }
}

fn record_call(operation: &'static str, start: Instant, error: Option<&Error>) {
    let elapsed = start.elapsed();
    match error {
        None => {
            #[cfg(feature = "metrics")]
            crate::observability::record_query(operation, elapsed);
        }
        Some(e) => {
            tracing::warn!(
                operation,
                kind = e.kind(),
                error = %e,
                elapsed_ms = elapsed.as_millis() as u64,
                "Database call failed"
            );
            #[cfg(feature = "metrics")]
            crate::observability::record_query_error(
                operation,
                e.kind(),
            );
        }
    }
}

fn detect_changes_sql(detect_proc: &str, lookback: Duration) -> String {
    let minutes = lookback.as_secs() / 60;
    DETECT_CHANGES_TEMPLATE
        .replace("{PROC}", detect_proc)
        .replace("{MINUTES}", &minutes.to_string())
}

fn procedure_parameters_sql(procedure: &str) -> String {
    let upper = procedure.to_uppercase();
    match parse_qualified_name(&upper) {
        (Some(schema), name) => PROCEDURE_PARAMETERS_TEMPLATE
            .replace("{SCHEMA}", schema)
            .replace("{PROC}", name),
        (None, name) => PROCEDURE_PARAMETERS_CURRENT_SCHEMA.replace("{PROC}", name),
    }
}

fn parameter_from_values(
    name: Option<HdbValue<'_>>,
    data_type: Option<HdbValue<'_>>,
    direction: Option<HdbValue<'_>>,
    position: Option<HdbValue<'_>>,
) -> Option<ProcedureParameter> {
    let (
        Some(HdbValue::STRING(name)),
        Some(HdbValue::STRING(data_type)),
        Some(HdbValue::STRING(direction)),
    ) = (name, data_type, direction)
    else {
        return None;
    };

    let position = match position {
        Some(HdbValue::INT(p)) => u32::try_from(p).ok()?,
        Some(HdbValue::SMALLINT(p)) => u32::try_from(p).ok()?,
        Some(HdbValue::BIGINT(p)) => u32::try_from(p).ok()?,
        _ => return None,
    };

    let direction = direction.parse::<ParameterDirection>().ok()?;

    Some(ProcedureParameter {
        name,
        data_type,
        direction,
        position,
    })
}
