//! Configuration Module
//!
//! Loads the user-facing cache settings from environment variables and
//! translates them into one [`CacheConfiguration`] per metadata category.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CacheConfiguration;
use crate::error::Result;
use crate::metadata::MetadataCategory;

const SECS_PER_HOUR: u64 = 60 * 60;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// User-facing cache settings.
///
/// All values can be configured via environment variables with sensible
/// defaults, and the diagnostics surface accepts the same shape as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of entries per category cache
    pub max_entries: usize,
    /// TTL in hours for track metadata (tags change often)
    pub track_ttl_hours: u64,
    /// TTL in hours for album metadata
    pub album_ttl_hours: u64,
    /// TTL in hours for external provider lookups (stable)
    pub external_ttl_hours: u64,
    /// Background cleanup interval in seconds
    pub cleanup_interval_secs: u64,
    /// Shrink caches while the process is under memory pressure
    pub enable_memory_pressure: bool,
    /// Resident memory threshold in megabytes
    pub memory_threshold_mb: u64,
    /// Pre-populate caches at startup
    pub enable_cache_warming: bool,
    /// Diagnostics HTTP server port
    pub server_port: u16,
}

impl Settings {
    /// Creates Settings by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum entries per cache (default: 1000)
    /// - `CACHE_TRACK_TTL_HOURS` - Track metadata TTL (default: 1)
    /// - `CACHE_ALBUM_TTL_HOURS` - Album metadata TTL (default: 24)
    /// - `CACHE_EXTERNAL_TTL_HOURS` - External lookup TTL (default: 168)
    /// - `CACHE_CLEANUP_INTERVAL_SECS` - Cleanup frequency (default: 300)
    /// - `CACHE_MEMORY_PRESSURE` - Enable memory-pressure shrink (default: true)
    /// - `CACHE_MEMORY_THRESHOLD_MB` - Pressure threshold (default: 512)
    /// - `CACHE_WARMING` - Enable cache warming (default: false)
    /// - `SERVER_PORT` - Diagnostics HTTP port (default: 3000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates Settings from an arbitrary variable lookup.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            max_entries: parse_or(&lookup, "CACHE_MAX_ENTRIES", defaults.max_entries),
            track_ttl_hours: parse_or(&lookup, "CACHE_TRACK_TTL_HOURS", defaults.track_ttl_hours),
            album_ttl_hours: parse_or(&lookup, "CACHE_ALBUM_TTL_HOURS", defaults.album_ttl_hours),
            external_ttl_hours: parse_or(
                &lookup,
                "CACHE_EXTERNAL_TTL_HOURS",
                defaults.external_ttl_hours,
            ),
            cleanup_interval_secs: parse_or(
                &lookup,
                "CACHE_CLEANUP_INTERVAL_SECS",
                defaults.cleanup_interval_secs,
            ),
            enable_memory_pressure: parse_or(
                &lookup,
                "CACHE_MEMORY_PRESSURE",
                defaults.enable_memory_pressure,
            ),
            memory_threshold_mb: parse_or(
                &lookup,
                "CACHE_MEMORY_THRESHOLD_MB",
                defaults.memory_threshold_mb,
            ),
            enable_cache_warming: parse_or(&lookup, "CACHE_WARMING", defaults.enable_cache_warming),
            server_port: parse_or(&lookup, "SERVER_PORT", defaults.server_port),
        }
    }

    /// TTL applied to entries of `category`.
    pub fn ttl_for(&self, category: MetadataCategory) -> Duration {
        let hours = match category {
            MetadataCategory::Track => self.track_ttl_hours,
            MetadataCategory::Album => self.album_ttl_hours,
            MetadataCategory::External => self.external_ttl_hours,
        };
        Duration::from_secs(hours.saturating_mul(SECS_PER_HOUR))
    }

    /// Builds the validated cache configuration for `category`.
    pub fn cache_configuration(&self, category: MetadataCategory) -> Result<CacheConfiguration> {
        CacheConfiguration::builder()
            .max_capacity(self.max_entries)
            .default_ttl(self.ttl_for(category))
            .cleanup_interval(Duration::from_secs(self.cleanup_interval_secs))
            .memory_pressure_adjustment(self.enable_memory_pressure)
            .memory_pressure_threshold_bytes(self.memory_threshold_mb.saturating_mul(BYTES_PER_MB))
            .build()
    }

    /// Checks that every category configuration can be built.
    pub fn validate(&self) -> Result<()> {
        for category in MetadataCategory::ALL {
            self.cache_configuration(category)?;
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            track_ttl_hours: 1,
            album_ttl_hours: 24,
            external_ttl_hours: 168,
            cleanup_interval_secs: 300,
            enable_memory_pressure: true,
            memory_threshold_mb: 512,
            enable_cache_warming: false,
            server_port: 3000,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
