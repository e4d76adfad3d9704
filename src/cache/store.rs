//! Cache Store Module
//!
//! Main cache engine combining a concurrent key index with a recency list,
//! per-entry TTL expiration and memory-pressure-aware capacity.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheConfiguration, CacheEntry, CacheStatistics, Clock, MemoryPressure, MemoryProbe,
    ProcessMemoryProbe, RecencyList, StatsCounters, SystemClock,
};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_cleanup_task;

// == Maintenance Report ==
/// What one background maintenance cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    /// Entries removed because their TTL elapsed
    pub expired: usize,
    /// Entries evicted to fit a reduced capacity
    pub evicted: usize,
    /// Memory pressure observed after the sweep
    pub pressure: MemoryPressure,
}

// == TTL Cache ==
/// Bounded key/value cache with LRU eviction and per-entry TTL.
///
/// All operations take `&self`; share the cache behind an [`Arc`].
/// Order-affecting operations serialize on one writer lock, while
/// existence checks read the concurrent index without it and statistics
/// are plain atomics.
///
/// ```
/// use std::time::Duration;
/// use soundtrack_cache::cache::{CacheConfiguration, TtlCache};
///
/// let config = CacheConfiguration::new(3, Duration::from_secs(3600)).unwrap();
/// let cache: TtlCache<String, i32> = TtlCache::new(config).unwrap();
///
/// cache.add("a".to_string(), 1, None);
/// assert_eq!(cache.try_get("a"), Some(1));
/// assert_eq!(cache.try_get("b"), None);
/// ```
pub struct TtlCache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Key to recency-list slot
    index: DashMap<K, usize>,
    /// Entries ordered from most to least recently used
    list: RwLock<RecencyList<K, V>>,
    /// Performance counters
    stats: StatsCounters,
    /// Effective capacity, lowered under memory pressure
    capacity: AtomicUsize,
    config: CacheConfiguration,
    clock: C,
    probe: Option<Arc<dyn MemoryProbe>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl<K, V> TtlCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a cache using the system clock.
    ///
    /// When memory-pressure adjustment is enabled the process memory probe
    /// is attached here, so probe failures surface at construction.
    pub fn new(config: CacheConfiguration) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates a cache driven by a custom clock.
    pub fn with_clock(config: CacheConfiguration, clock: C) -> Result<Self> {
        let probe: Option<Arc<dyn MemoryProbe>> = if config.memory_pressure_adjustment_enabled() {
            Some(Arc::new(ProcessMemoryProbe::new()?))
        } else {
            None
        };

        debug!(
            "Cache created: max_capacity={}, default_ttl={:?}, cleanup_interval={:?}",
            config.max_capacity(),
            config.default_ttl(),
            config.cleanup_interval()
        );

        Ok(Self {
            index: DashMap::new(),
            list: RwLock::new(RecencyList::new()),
            stats: StatsCounters::new(),
            capacity: AtomicUsize::new(config.max_capacity()),
            config,
            clock,
            probe,
            sweeper: Mutex::new(None),
            disposed: AtomicBool::new(false),
        })
    }

    /// Replaces the memory probe used by [`adjust_for_memory_pressure`].
    ///
    /// [`adjust_for_memory_pressure`]: TtlCache::adjust_for_memory_pressure
    pub fn with_memory_probe(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    // == Try Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// Every call counts as a request. A hit moves the entry to the head of
    /// the recency list; an expired entry is removed and counted as both a
    /// miss and an expiration.
    pub fn try_get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        if !self.index.contains_key(key) {
            self.stats.record_miss();
            return None;
        }

        let now = self.clock.now();
        let mut list = self.list.write();

        // Re-read under the lock: the slot may have been freed meanwhile.
        let Some(slot) = self.index.get(key).map(|slot| *slot) else {
            self.stats.record_miss();
            return None;
        };

        let expired = match list.get(slot) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            list.remove(slot);
            self.index.remove(key);
            self.stats.record_expired_miss();
            return None;
        }

        list.move_to_front(slot);
        let value = list.get_mut(slot).map(|entry| {
            entry.record_access(now);
            entry.value.clone()
        });
        self.stats.record_hit();
        value
    }

    // == Add ==
    /// Stores `value` under `key`, expiring after `ttl` or the default TTL.
    ///
    /// An existing entry (live or expired) is replaced in place and moved
    /// to the head. A new entry first evicts from the tail, one at a time,
    /// until there is room under the effective capacity.
    pub fn add(&self, key: K, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.config.default_ttl());
        let now = self.clock.now();
        let mut list = self.list.write();

        if let Some(slot) = self.index.get(&key).map(|slot| *slot) {
            if let Some(entry) = list.get_mut(slot) {
                entry.replace(value, ttl, now);
                list.move_to_front(slot);
                return;
            }
        }

        let capacity = self.capacity.load(Ordering::Relaxed);
        self.evict_locked(&mut list, capacity.saturating_sub(1));

        let slot = list.push_front(CacheEntry::new(key.clone(), value, ttl, now));
        self.index.insert(key, slot);
    }

    // == Remove ==
    /// Removes `key` whether live or expired; returns whether it was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut list = self.list.write();
        match self.index.remove(key) {
            Some((_, slot)) => {
                list.remove(slot);
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Drops every entry and resets all statistics.
    pub fn clear(&self) {
        let mut list = self.list.write();
        list.clear();
        self.index.clear();
        self.stats.reset();
    }

    // == Statistics ==
    /// Returns a snapshot of the current statistics.
    pub fn statistics(&self) -> CacheStatistics {
        let current_size = self.list.read().len();
        self.stats.snapshot(
            current_size,
            self.capacity.load(Ordering::Relaxed),
            self.config.max_capacity(),
            self.config.default_ttl(),
        )
    }

    // == Cleanup Expired ==
    /// Removes every entry at or past its expiration instant.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut list = self.list.write();

        let expired: Vec<usize> = list
            .iter()
            .filter(|(_, entry)| entry.is_due_at(now))
            .map(|(slot, _)| slot)
            .collect();

        for slot in &expired {
            if let Some(entry) = list.remove(*slot) {
                self.index.remove(&entry.key);
                self.stats.record_expiration();
            }
        }

        expired.len()
    }

    // == Adjust For Memory Pressure ==
    /// Shrinks or restores the effective capacity from the process's
    /// resident memory.
    ///
    /// Above the threshold the capacity drops to the configured fraction
    /// and least recently used entries are evicted down to it. At or below
    /// it the configured capacity is restored without re-adding anything.
    /// Safe to call repeatedly.
    pub fn adjust_for_memory_pressure(&self) -> Result<MemoryPressure> {
        self.adjust_capacity().map(|(pressure, _)| pressure)
    }

    // == Run Maintenance ==
    /// One background cycle: sweep expired entries, then re-check memory
    /// pressure.
    pub fn run_maintenance(&self) -> Result<MaintenanceReport> {
        let expired = self.cleanup_expired();
        let (pressure, evicted) = self.adjust_capacity()?;
        Ok(MaintenanceReport {
            expired,
            evicted,
            pressure,
        })
    }

    // == Warm ==
    /// Bulk-adds entries with the default TTL; returns how many were added.
    pub fn warm<I>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut added = 0;
        for (key, value) in entries {
            self.add(key, value, None);
            added += 1;
        }
        added
    }

    // == Contains Key ==
    /// Lock-free existence check; expired-but-unswept entries count.
    ///
    /// Does not count as a request and does not touch recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.list.read().len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.list.read().is_empty()
    }

    /// Effective capacity.
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    /// The configuration this cache was built with.
    pub fn configuration(&self) -> &CacheConfiguration {
        &self.config
    }

    // == Dispose ==
    /// Stops the background sweeper. Calling it again does nothing.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
            debug!("Cache cleanup task stopped");
        }
    }

    /// Whether [`dispose`](TtlCache::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Evicts from the tail until at most `target` entries remain.
    fn evict_locked(&self, list: &mut RecencyList<K, V>, target: usize) -> usize {
        let mut evicted = 0;
        while list.len() > target {
            let Some(entry) = list.pop_back() else {
                break;
            };
            self.index.remove(&entry.key);
            self.stats.record_eviction();
            evicted += 1;
        }
        evicted
    }

    fn adjust_capacity(&self) -> Result<(MemoryPressure, usize)> {
        let probe = match &self.probe {
            Some(probe) if self.config.memory_pressure_adjustment_enabled() => probe,
            _ => return Ok((MemoryPressure::Disabled, 0)),
        };

        let resident = probe.resident_bytes()?;
        let threshold = self.config.memory_pressure_threshold_bytes();
        let mut list = self.list.write();

        if resident > threshold {
            let reduced = self.config.pressure_capacity();
            let previous = self.capacity.swap(reduced, Ordering::Relaxed);
            let evicted = self.evict_locked(&mut list, reduced);
            if previous != reduced {
                warn!(
                    "Memory pressure: resident={} bytes exceeds {} bytes, capacity {} -> {}, evicted {} entries",
                    resident, threshold, previous, reduced, evicted
                );
            }
            Ok((MemoryPressure::High, evicted))
        } else {
            let full = self.config.max_capacity();
            let previous = self.capacity.swap(full, Ordering::Relaxed);
            if previous != full {
                info!("Memory pressure relieved: capacity {} -> {}", previous, full);
            }
            Ok((MemoryPressure::Normal, 0))
        }
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    C: Clock,
{
    // == Start Cleanup ==
    /// Attaches a background task running [`run_maintenance`] every
    /// `cleanup_interval`.
    ///
    /// Must be called inside a tokio runtime. A second call while a task is
    /// attached is a no-op.
    ///
    /// [`run_maintenance`]: TtlCache::run_maintenance
    pub fn start_cleanup(self: &Arc<Self>) -> Result<()> {
        if self.is_disposed() {
            return Err(CacheError::Internal("cache has been disposed".to_string()));
        }

        let mut sweeper = self.sweeper.lock();
        if sweeper.is_some() {
            return Ok(());
        }
        *sweeper = Some(spawn_cleanup_task(
            Arc::downgrade(self),
            self.config.cleanup_interval(),
        )?);
        Ok(())
    }
}

impl<K, V, C> Drop for TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<K, V, C> fmt::Debug for TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("len", &self.list.read().len())
            .field("capacity", &self.capacity.load(Ordering::Relaxed))
            .field("config", &self.config)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
