//! Advisory in-process cache of fetched series, keyed by request.

use super::provider::{DataError, DataProvider, DataSource, FetchRequest};
use crate::domain::PriceSeries;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Entries older than the TTL are treated as missing.
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<FetchRequest, (Instant, PriceSeries)>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock leaves the map intact, so recover it.
    fn lock(&self) -> MutexGuard<'_, HashMap<FetchRequest, (Instant, PriceSeries)>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, request: &FetchRequest) -> Option<PriceSeries> {
        let mut entries = self.lock();
        if let Some((stored, series)) = entries.get(request) {
            if stored.elapsed() < self.ttl {
                return Some(series.clone());
            }
            entries.remove(request);
        }
        None
    }

    pub fn insert(&self, request: FetchRequest, series: PriceSeries) {
        self.lock().insert(request, (Instant::now(), series));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Wraps a provider with a [`MemoryCache`]. Errors and empty series are not cached.
pub struct CachedProvider<P> {
    inner: P,
    cache: MemoryCache,
}

impl<P: DataProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: MemoryCache::new(ttl),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn cache(&self) -> &MemoryCache {
        &self.cache
    }
}

impl<P: DataProvider> DataProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn source(&self) -> DataSource {
        self.inner.source()
    }

    fn source_for(&self, request: &FetchRequest) -> DataSource {
        self.inner.source_for(request)
    }

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, DataError> {
        if let Some(series) = self.cache.get(request) {
            tracing::debug!(symbol = %request.symbol, "memory cache hit");
            return Ok(series);
        }
        let series = self.inner.fetch(request)?;
        if !series.is_empty() {
            self.cache.insert(request.clone(), series.clone());
        }
        Ok(series)
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
