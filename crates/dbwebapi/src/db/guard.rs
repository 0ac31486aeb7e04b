//! Timeout wrapper for database calls

use std::future::Future;
use std::time::Duration;

use crate::Error;

/// Bounds every database round trip by the configured query timeout
#[derive(Debug, Clone, Copy)]
pub struct QueryGuard {
    timeout: Duration,
}

impl QueryGuard {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute a query future with timeout
    pub async fn execute<F, T, E>(&self, query_fn: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<Error>,
    {
        tokio::time::timeout(self.timeout, query_fn)
            .await
            .map_err(|_| Error::QueryTimeout(self.timeout))?
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_guard_success() {
        let guard = QueryGuard::new(Duration::from_secs(1));
        let result: Result<i32, Error> = guard.execute(async { Ok::<_, Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_query_guard_timeout() {
        let guard = QueryGuard::new(Duration::from_millis(10));
        let result: Result<(), Error> = guard
            .execute(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, Error>(())
            })
            .await;
        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(err, Error::QueryTimeout(d) if d == Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn test_query_guard_propagates_error() {
        let guard = QueryGuard::new(Duration::from_secs(1));
        let result: Result<(), Error> = guard
            .execute(async { Err::<(), _>(Error::Query("boom".to_string())) })
            .await;
        assert!(result.unwrap_err().is_query());
    }

    #[test]
    fn test_timeout_accessor() {
        assert_eq!(
            QueryGuard::new(Duration::from_secs(30)).timeout(),
            Duration::from_secs(30)
        );
    }
}
