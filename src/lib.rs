//! Soundtrack Cache - TTL/LRU metadata cache for a game soundtrack player
//!
//! Bounded, thread-safe caches with per-entry expiration, LRU eviction,
//! memory-pressure-aware capacity and a background sweeper, plus the
//! metadata service and diagnostics API built on top of them.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod metadata;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheConfiguration, CacheStatistics, TtlCache};
pub use config::Settings;
pub use error::{CacheError, Result};
pub use metadata::{MetadataCategory, MetadataService};
