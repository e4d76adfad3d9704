//! Cache Module
//!
//! Provides an in-memory cache with TTL expiration, LRU eviction and
//! memory-pressure-aware capacity.

mod clock;
mod config;
mod entry;
mod lru;
mod memory;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{
    CacheConfiguration, CacheConfigurationBuilder, DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_CAPACITY,
    DEFAULT_MEMORY_THRESHOLD_BYTES, DEFAULT_PRESSURE_CAPACITY_RATIO, DEFAULT_TTL,
};
pub use entry::CacheEntry;
pub use lru::{RecencyIter, RecencyList};
pub use memory::{ManualMemoryProbe, MemoryPressure, MemoryProbe, ProcessMemoryProbe};
pub use stats::{CacheStatistics, StatsCounters};
pub use store::{MaintenanceReport, TtlCache};
