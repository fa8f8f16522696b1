use crate::core::currency::CurrencyCode;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// How long, in seconds, a fetched rate may be served without asking the provider again.
pub const FRESHNESS_WINDOW_SECS: i64 = 5 * 60;

/// Ordered `(from, to)` pair. `(USD, EUR)` and `(EUR, USD)` are distinct keys.
pub type CurrencyPair = (CurrencyCode, CurrencyCode);

#[derive(Debug, Clone, PartialEq)]
pub struct RateCacheEntry {
    pub pair: CurrencyPair,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

impl RateCacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.fetched_at < window
    }
}

/// In-memory store of the last known rate per currency pair.
///
/// Stale entries stay in place until a newer fetch replaces them. Lookups
/// never touch the network and never fail.
pub struct RateCache {
    inner: RwLock<HashMap<CurrencyPair, RateCacheEntry>>,
    freshness: Duration,
}

impl RateCache {
    pub fn new() -> Self {
        Self::with_freshness(Duration::seconds(FRESHNESS_WINDOW_SECS))
    }

    pub fn with_freshness(freshness: Duration) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            freshness,
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Returns the last stored entry for the exact `(from, to)` direction, fresh or not.
    pub fn get(&self, pair: &CurrencyPair) -> Option<RateCacheEntry> {
        let cache = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let entry = cache.get(pair).cloned();
        if entry.is_some() {
            debug!("Cache HIT for pair: {}/{}", pair.0, pair.1);
        } else {
            debug!("Cache MISS for pair: {}/{}", pair.0, pair.1);
        }
        entry
    }

    /// Like [`RateCache::get`], but drops entries older than the freshness window.
    pub fn get_fresh(&self, pair: &CurrencyPair, now: DateTime<Utc>) -> Option<RateCacheEntry> {
        self.get(pair).filter(|entry| {
            let fresh = entry.is_fresh(now, self.freshness);
            if !fresh {
                debug!(
                    "Cache entry stale for pair: {}/{} (fetched at {})",
                    pair.0, pair.1, entry.fetched_at
                );
            }
            fresh
        })
    }

    /// Stores a rate, replacing any previous entry. Last writer wins.
    /// Non-positive or non-finite rates are ignored.
    pub fn put(&self, pair: CurrencyPair, rate: f64, fetched_at: DateTime<Utc>) {
        if !(rate.is_finite() && rate > 0.0) {
            debug!("Cache PUT refused for pair: {}/{} rate {}", pair.0, pair.1, rate);
            return;
        }
        let mut cache = self.inner.write().unwrap_or_else(|e| e.into_inner());
        debug!("Cache PUT for pair: {}/{}", pair.0, pair.1);
        cache.insert(
            pair.clone(),
            RateCacheEntry {
                pair,
                rate,
                fetched_at,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}
