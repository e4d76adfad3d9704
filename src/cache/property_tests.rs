//! Property-Based Tests for Cache Module
//!
//! Drives the cache with random operation sequences and checks it against
//! a simple reference model.

use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cache::{
    CacheConfiguration, CacheEntry, Clock, ManualMemoryProbe, MemoryPressure, MockClock, TtlCache,
};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(3600);
const KEY_SPACE: u8 = 12;

// == Strategies ==
#[derive(Debug, Clone)]
enum CacheOp {
    Add { key: u8, value: i32 },
    Get { key: u8 },
    Remove { key: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (0..KEY_SPACE, any::<i32>()).prop_map(|(key, value)| CacheOp::Add { key, value }),
        (0..KEY_SPACE).prop_map(|key| CacheOp::Get { key }),
        (0..KEY_SPACE).prop_map(|key| CacheOp::Remove { key }),
    ]
}

fn new_cache(capacity: usize) -> (TtlCache<u8, i32, MockClock>, MockClock) {
    let clock = MockClock::new();
    let config = CacheConfiguration::new(capacity, TEST_TTL).unwrap();
    (TtlCache::with_clock(config, clock.clone()).unwrap(), clock)
}

/// Reference LRU: front is most recently used.
#[derive(Default)]
struct ModelLru {
    entries: VecDeque<(u8, i32)>,
    capacity: usize,
    evictions: u64,
}

impl ModelLru {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn add(&mut self, key: u8, value: i32) {
        if let Some(pos) = self.position(key) {
            self.entries.remove(pos);
        } else if self.entries.len() >= self.capacity {
            self.entries.pop_back();
            self.evictions += 1;
        }
        self.entries.push_front((key, value));
    }

    fn get(&mut self, key: u8) -> Option<i32> {
        let pos = self.position(key)?;
        let entry = self.entries.remove(pos)?;
        self.entries.push_front(entry);
        Some(entry.1)
    }

    fn remove(&mut self, key: u8) -> bool {
        match self.position(key) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Without expirations the cache behaves exactly like a reference LRU:
    // same lookups, same removals, same eviction count.
    #[test]
    fn prop_matches_reference_lru(
        capacity in 1usize..8,
        ops in prop::collection::vec(cache_op_strategy(), 1..80),
    ) {
        let (cache, _) = new_cache(capacity);
        let mut model = ModelLru::new(capacity);

        for op in ops {
            match op {
                CacheOp::Add { key, value } => {
                    cache.add(key, value, None);
                    model.add(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.try_get(&key), model.get(key));
                }
                CacheOp::Remove { key } => {
                    prop_assert_eq!(cache.remove(&key), model.remove(key));
                }
            }
            prop_assert!(cache.len() <= capacity, "Capacity exceeded");
            prop_assert_eq!(cache.len(), model.entries.len());
        }

        prop_assert_eq!(cache.statistics().evictions, model.evictions);
    }

    // Every lookup is counted exactly once as a hit or a miss.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let (cache, _) = new_cache(4);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Add { key, value } => cache.add(key, value, None),
                CacheOp::Get { key } => match cache.try_get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Remove { key } => {
                    cache.remove(&key);
                }
            }
        }

        let stats = cache.statistics();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_requests, expected_hits + expected_misses);
        prop_assert_eq!(stats.current_size, cache.len());
        if stats.total_requests > 0 {
            let ratio = expected_hits as f64 / stats.total_requests as f64;
            prop_assert!((stats.hit_ratio - ratio).abs() < 1e-9);
        } else {
            prop_assert_eq!(stats.hit_ratio, 0.0);
        }
    }

    // An entry stays readable up to its expiration instant and is gone
    // once time moves past it.
    #[test]
    fn prop_ttl_boundary(ttl_secs in 1u64..10_000, elapsed_secs in 0u64..20_000) {
        let (cache, clock) = new_cache(4);
        cache.add(1, 42, Some(Duration::from_secs(ttl_secs)));

        clock.advance(Duration::from_secs(elapsed_secs));

        let found = cache.try_get(&1);
        if elapsed_secs <= ttl_secs {
            prop_assert_eq!(found, Some(42));
        } else {
            prop_assert_eq!(found, None);
            prop_assert_eq!(cache.statistics().expirations, 1);
            prop_assert!(!cache.contains_key(&1));
        }
    }

    // Each recorded access bumps the counter and moves last_access forward
    // without touching the expiration.
    #[test]
    fn prop_access_tracking(gaps in prop::collection::vec(0u64..100, 0..30)) {
        let clock = MockClock::new();
        let mut entry = CacheEntry::new(1u8, 7, TEST_TTL, clock.now());
        let expires_at = entry.expires_at;

        for gap in &gaps {
            clock.advance(Duration::from_secs(*gap));
            entry.record_access(clock.now());
            prop_assert_eq!(entry.last_access, clock.now());
        }

        prop_assert_eq!(entry.access_count, gaps.len() as u64);
        prop_assert_eq!(entry.expires_at, expires_at);
    }

    // The sweep removes exactly the entries whose TTL has elapsed.
    #[test]
    fn prop_cleanup_removes_only_expired(
        ttls in prop::collection::vec(1u64..100, 1..20),
        elapsed in 0u64..120,
    ) {
        let (cache, clock) = new_cache(ttls.len());
        for (i, ttl) in ttls.iter().enumerate() {
            cache.add(i as u8, i as i32, Some(Duration::from_secs(*ttl)));
        }

        clock.advance(Duration::from_secs(elapsed));
        let removed = cache.cleanup_expired();

        let expected = ttls.iter().filter(|ttl| **ttl <= elapsed).count();
        prop_assert_eq!(removed, expected);
        prop_assert_eq!(cache.len(), ttls.len() - expected);
        prop_assert_eq!(cache.statistics().expirations, expected as u64);
    }

    // Under pressure the cache shrinks to the reduced capacity; once
    // relieved, capacity is restored but evicted entries stay gone.
    #[test]
    fn prop_pressure_shrinks_and_restores(capacity in 1usize..40, fill in 0usize..40) {
        let probe = Arc::new(ManualMemoryProbe::new(2_000));
        let config = CacheConfiguration::builder()
            .max_capacity(capacity)
            .memory_pressure_adjustment(true)
            .memory_pressure_threshold_bytes(1_000)
            .pressure_capacity_ratio(0.5)
            .build()
            .unwrap();
        let cache: TtlCache<u8, i32, MockClock> = TtlCache::with_clock(config, MockClock::new())
            .unwrap()
            .with_memory_probe(probe.clone());

        for i in 0..fill {
            cache.add(i as u8, i as i32, None);
        }
        let before = cache.len();

        let reduced = std::cmp::max(1, capacity / 2);
        prop_assert_eq!(cache.adjust_for_memory_pressure().unwrap(), MemoryPressure::High);
        prop_assert_eq!(cache.capacity(), reduced);
        prop_assert_eq!(cache.len(), before.min(reduced));

        probe.set(500);
        prop_assert_eq!(cache.adjust_for_memory_pressure().unwrap(), MemoryPressure::Normal);
        prop_assert_eq!(cache.capacity(), capacity);
        prop_assert_eq!(cache.len(), before.min(reduced));
    }
}

// == Concurrency ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // Concurrent callers never push the cache past capacity and every
    // request is accounted for.
    #[test]
    fn prop_concurrent_operations_keep_invariants(
        thread_ops in prop::collection::vec(
            prop::collection::vec(cache_op_strategy(), 1..100),
            2..6,
        ),
    ) {
        let (cache, _) = new_cache(5);
        let cache = Arc::new(cache);

        let handles: Vec<_> = thread_ops
            .into_iter()
            .map(|ops| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let mut requests = 0u64;
                    for op in ops {
                        match op {
                            CacheOp::Add { key, value } => cache.add(key, value, None),
                            CacheOp::Get { key } => {
                                cache.try_get(&key);
                                requests += 1;
                            }
                            CacheOp::Remove { key } => {
                                cache.remove(&key);
                            }
                        }
                    }
                    requests
                })
            })
            .collect();

        let requests: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        let stats = cache.statistics();
        prop_assert!(cache.len() <= 5);
        prop_assert_eq!(stats.total_requests, requests);
        prop_assert_eq!(stats.hits + stats.misses, requests);
        for key in 0..KEY_SPACE {
            if cache.contains_key(&key) {
                prop_assert!(cache.try_get(&key).is_some());
            }
        }
    }
}
