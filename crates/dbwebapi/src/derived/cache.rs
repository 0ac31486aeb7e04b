//! In-memory cache of derived stored procedure parameters

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

use crate::types::ProcedureParameter;

/// Cache entry with the derived parameters and the time they were cached
struct CacheEntry {
    parameters: Arc<[ProcedureParameter]>,
    cached_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, expire_interval: Duration) -> bool {
        self.cached_at.elapsed() >= expire_interval
    }
}

/// Cache statistics for observability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub entry_count: usize,
}

/// Thread-safe cache of procedure parameter metadata keyed by qualified name.
///
/// # Expiry
///
/// Entries carry no TTL of their own. Each read compares the entry age with
/// the cache-wide `expire_interval`, so changing the interval takes effect
/// for entries already cached. A zero interval disables caching: every entry
/// reads as expired.
///
/// Keys are upper-cased, matching how HANA stores unquoted identifiers.
pub struct DerivedParametersCache {
    store: RwLock<HashMap<String, CacheEntry>>,
    expire_interval_nanos: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl std::fmt::Debug for DerivedParametersCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedParametersCache")
            .field("expire_interval", &self.expire_interval())
            .field("entry_count", &self.store.read().len())
            .finish_non_exhaustive()
    }
}

impl DerivedParametersCache {
    #[must_use]
    pub fn new(expire_interval: Duration) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            expire_interval_nanos: AtomicU64::new(duration_to_nanos(expire_interval)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn expire_interval(&self) -> Duration {
        Duration::from_nanos(self.expire_interval_nanos.load(Ordering::Acquire))
    }

    pub fn set_expire_interval(&self, interval: Duration) {
        self.expire_interval_nanos
            .store(duration_to_nanos(interval), Ordering::Release);
    }

    /// Get cached parameters, dropping the entry if it has expired
    pub fn get(&self, procedure: &str) -> Option<Arc<[ProcedureParameter]>> {
        let key = cache_key(procedure);
        let expire_interval = self.expire_interval();
        let store = self.store.read();

        match store.get(&key) {
            Some(entry) if !entry.is_expired(expire_interval) => {
                let parameters = Arc::clone(&entry.parameters);
                drop(store);
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(parameters)
            }
            Some(_) => {
                drop(store);
                self.misses.fetch_add(1, Ordering::Relaxed);
                self.remove_if_expired(&key, expire_interval);
                None
            }
            None => {
                drop(store);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(
        &self,
        procedure: &str,
        parameters: impl Into<Arc<[ProcedureParameter]>>,
    ) -> Arc<[ProcedureParameter]> {
        let parameters = parameters.into();
        let entry = CacheEntry {
            parameters: Arc::clone(&parameters),
            cached_at: Instant::now(),
        };
        self.store.write().insert(cache_key(procedure), entry);
        parameters
    }

    /// Remove the given procedures, returning how many were actually cached
    pub fn invalidate<I, S>(&self, procedures: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = self.store.write();
        let removed = procedures
            .into_iter()
            .filter(|name| store.remove(&cache_key(name.as_ref())).is_some())
            .count() as u64;
        drop(store);

        if removed > 0 {
            self.invalidations.fetch_add(removed, Ordering::Relaxed);
        }
        removed
    }

    /// Drop every expired entry, returning the number removed
    pub fn purge_expired(&self) -> usize {
        let expire_interval = self.expire_interval();
        let mut store = self.store.write();
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(expire_interval));
        before - store.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> DerivedCacheStats {
        DerivedCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            entry_count: self.len(),
        }
    }

    fn remove_if_expired(&self, key: &str, expire_interval: Duration) {
        let mut store = self.store.write();
        if store
            .get(key)
            .is_some_and(|entry| entry.is_expired(expire_interval))
        {
            store.remove(key);
        }
    }
}

fn cache_key(procedure: &str) -> String {
    procedure.trim().to_uppercase()
}

fn duration_to_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
