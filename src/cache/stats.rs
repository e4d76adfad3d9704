//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! expirations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

// == Cache Statistics ==
/// Point-in-time snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStatistics {
    /// Number of `try_get` calls
    pub total_requests: u64,
    /// Number of lookups that found a live entry
    pub hits: u64,
    /// Number of lookups that found nothing or an expired entry
    pub misses: u64,
    /// Number of entries removed to honour the capacity
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the cache
    pub current_size: usize,
    /// Effective capacity, lowered while under memory pressure
    pub max_size: usize,
    /// Capacity the cache was configured with
    pub configured_capacity: usize,
    /// hits / total_requests, 0.0 before the first request
    pub hit_ratio: f64,
    /// TTL applied to entries added without their own
    #[serde(serialize_with = "serialize_secs")]
    pub default_ttl: Duration,
}

fn serialize_secs<S: serde::Serializer>(
    ttl: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(ttl.as_secs())
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

// == Stats Counters ==
/// Lock-free counters updated by cache operations.
///
/// Readable while mutations are in flight; a snapshot is not atomic across
/// counters.
#[derive(Debug, Default)]
pub struct StatsCounters {
    total_requests: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl StatsCounters {
    // == Constructor ==
    /// Creates counters starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Counts a lookup that returned a live value.
    pub fn record_hit(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Counts a lookup that found no entry.
    pub fn record_miss(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Expired Miss ==
    /// Counts a lookup that found an expired entry and removed it.
    pub fn record_expired_miss(&self) {
        self.record_miss();
        self.record_expiration();
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    // == Reset ==
    /// Sets every counter back to zero.
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Builds a [`CacheStatistics`] from the counters and the given sizes.
    pub fn snapshot(
        &self,
        current_size: usize,
        max_size: usize,
        configured_capacity: usize,
        default_ttl: Duration,
    ) -> CacheStatistics {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);

        CacheStatistics {
            total_requests,
            hits,
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            current_size,
            max_size,
            configured_capacity,
            hit_ratio: ratio(hits, total_requests),
            default_ttl,
        }
    }
}
