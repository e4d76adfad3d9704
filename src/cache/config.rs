//! Cache configuration types and builder
//!
//! A [`CacheConfiguration`] is validated once when built and never changes
//! afterwards; reconfiguring means building a new cache.

use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default entry ceiling
pub const DEFAULT_MAX_CAPACITY: usize = 1000;

/// Default TTL for entries added without their own
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default period between background sweeps
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default resident-memory threshold above which capacity shrinks (512 MiB)
pub const DEFAULT_MEMORY_THRESHOLD_BYTES: u64 = 512 * 1024 * 1024;

/// Default fraction of the configured capacity kept under memory pressure
pub const DEFAULT_PRESSURE_CAPACITY_RATIO: f64 = 0.5;

/// Validated, immutable cache configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfiguration {
    max_capacity: usize,
    default_ttl: Duration,
    cleanup_interval: Duration,
    enable_memory_pressure_adjustment: bool,
    memory_pressure_threshold_bytes: u64,
    pressure_capacity_ratio: f64,
}

impl CacheConfiguration {
    /// Configuration with the given capacity and TTL and defaults elsewhere.
    ///
    /// ```
    /// use std::time::Duration;
    /// use soundtrack_cache::cache::CacheConfiguration;
    ///
    /// let config = CacheConfiguration::new(3, Duration::from_secs(3600)).unwrap();
    /// assert_eq!(config.max_capacity(), 3);
    /// ```
    pub fn new(max_capacity: usize, default_ttl: Duration) -> Result<Self> {
        Self::builder()
            .max_capacity(max_capacity)
            .default_ttl(default_ttl)
            .build()
    }

    /// Create a new configuration builder
    pub fn builder() -> CacheConfigurationBuilder {
        CacheConfigurationBuilder::default()
    }

    /// Ceiling on the number of entries.
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// TTL for entries added without their own.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Period between background sweeps.
    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    /// Whether capacity follows process memory usage.
    pub fn memory_pressure_adjustment_enabled(&self) -> bool {
        self.enable_memory_pressure_adjustment
    }

    /// Resident memory above which the cache shrinks.
    pub fn memory_pressure_threshold_bytes(&self) -> u64 {
        self.memory_pressure_threshold_bytes
    }

    /// Fraction of `max_capacity` kept while under pressure.
    pub fn pressure_capacity_ratio(&self) -> f64 {
        self.pressure_capacity_ratio
    }

    /// Capacity applied while under memory pressure, never below one.
    pub fn pressure_capacity(&self) -> usize {
        let reduced = (self.max_capacity as f64 * self.pressure_capacity_ratio).floor() as usize;
        reduced.clamp(1, self.max_capacity)
    }
}

impl Default for CacheConfiguration {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            default_ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            enable_memory_pressure_adjustment: false,
            memory_pressure_threshold_bytes: DEFAULT_MEMORY_THRESHOLD_BYTES,
            pressure_capacity_ratio: DEFAULT_PRESSURE_CAPACITY_RATIO,
        }
    }
}

/// Builder for [`CacheConfiguration`] with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigurationBuilder {
    config: CacheConfiguration,
}

impl CacheConfigurationBuilder {
    /// Set maximum number of entries
    pub fn max_capacity(mut self, capacity: usize) -> Self {
        self.config.max_capacity = capacity;
        self
    }

    /// Set TTL for entries added without their own
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl = ttl;
        self
    }

    /// Set the background sweep period
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.cleanup_interval = interval;
        self
    }

    /// Enable or disable memory-pressure capacity adjustment
    pub fn memory_pressure_adjustment(mut self, enabled: bool) -> Self {
        self.config.enable_memory_pressure_adjustment = enabled;
        self
    }

    /// Set the resident-memory threshold in bytes
    pub fn memory_pressure_threshold_bytes(mut self, bytes: u64) -> Self {
        self.config.memory_pressure_threshold_bytes = bytes;
        self
    }

    /// Set the fraction of capacity kept under pressure
    pub fn pressure_capacity_ratio(mut self, ratio: f64) -> Self {
        self.config.pressure_capacity_ratio = ratio;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<CacheConfiguration> {
        let config = self.config;

        if config.max_capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "max_capacity must be greater than zero".to_string(),
            ));
        }
        if config.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfiguration(
                "cleanup_interval must be greater than zero".to_string(),
            ));
        }
        let ratio = config.pressure_capacity_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(CacheError::InvalidConfiguration(format!(
                "pressure_capacity_ratio must be in (0, 1], got {}",
                ratio
            )));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfiguration::default();
        assert_eq!(config.max_capacity(), 1000);
        assert_eq!(config.default_ttl(), Duration::from_secs(3600));
        assert_eq!(config.cleanup_interval(), Duration::from_secs(300));
        assert!(!config.memory_pressure_adjustment_enabled());
        assert_eq!(config.pressure_capacity(), 500);
    }

    #[test]
    fn test_builder_sets_every_field() {
        let config = CacheConfiguration::builder()
            .max_capacity(10)
            .default_ttl(Duration::from_secs(5))
            .cleanup_interval(Duration::from_secs(1))
            .memory_pressure_adjustment(true)
            .memory_pressure_threshold_bytes(1024)
            .pressure_capacity_ratio(0.25)
            .build()
            .unwrap();

        assert_eq!(config.max_capacity(), 10);
        assert_eq!(config.default_ttl(), Duration::from_secs(5));
        assert_eq!(config.cleanup_interval(), Duration::from_secs(1));
        assert!(config.memory_pressure_adjustment_enabled());
        assert_eq!(config.memory_pressure_threshold_bytes(), 1024);
        assert_eq!(config.pressure_capacity(), 2);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = CacheConfiguration::new(0, Duration::from_secs(1));
        assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_zero_cleanup_interval_rejected() {
        let result = CacheConfiguration::builder()
            .cleanup_interval(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(CacheError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_ratio_out_of_range_rejected() {
        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let result = CacheConfiguration::builder()
                .pressure_capacity_ratio(ratio)
                .build();
            assert!(
                matches!(result, Err(CacheError::InvalidConfiguration(_))),
                "ratio {} should be rejected",
                ratio
            );
        }
    }

    #[test]
    fn test_pressure_capacity_never_zero() {
        let config = CacheConfiguration::builder()
            .max_capacity(1)
            .pressure_capacity_ratio(0.1)
            .build()
            .unwrap();
        assert_eq!(config.pressure_capacity(), 1);
    }
}
