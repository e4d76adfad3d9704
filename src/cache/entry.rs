//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single stored key/value pair with its expiration and access metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The caller-supplied key
    pub key: K,
    /// The stored value
    pub value: V,
    /// Instant after which the entry is considered expired
    pub expires_at: Instant,
    /// Instant of the last successful read (or the write that created it)
    pub last_access: Instant,
    /// Number of successful reads, informational only
    pub access_count: u64,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` after `now`.
    pub fn new(key: K, value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            key,
            value,
            expires_at: expiry(now, ttl),
            last_access: now,
            access_count: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is past its TTL at `now`.
    ///
    /// Reads use this check: the entry stays visible up to and including
    /// its expiration instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    // == Is Due ==
    /// Checks if the background sweep should drop the entry at `now`.
    ///
    /// The sweep also removes entries sitting exactly on their expiration
    /// instant.
    pub fn is_due_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Replace ==
    /// Replaces the value and resets the TTL, as a repeat `add` does.
    pub fn replace(&mut self, value: V, ttl: Duration, now: Instant) {
        self.value = value;
        self.expires_at = expiry(now, ttl);
        self.last_access = now;
    }

    // == Record Access ==
    /// Marks a successful read.
    pub fn record_access(&mut self, now: Instant) {
        self.last_access = now;
        self.access_count += 1;
    }
}

/// `now + ttl`, saturating far in the future for absurdly large TTLs.
fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .unwrap_or_else(|| now + Duration::from_secs(60 * 60 * 24 * 365 * 100))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let now = Instant::now();
        let entry = CacheEntry::new("k", "v", Duration::from_secs(60), now);

        assert_eq!(entry.value, "v");
        assert_eq!(entry.expires_at, now + Duration::from_secs(60));
        assert_eq!(entry.last_access, now);
        assert_eq!(entry.access_count, 0);
        assert!(!entry.is_expired_at(now));
    }

    #[test]
    fn test_entry_expiration() {
        let now = Instant::now();
        let entry = CacheEntry::new("k", 1, Duration::from_secs(1), now);

        assert!(!entry.is_expired_at(now + Duration::from_millis(999)));
        assert!(entry.is_expired_at(now + Duration::from_millis(1001)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::new("k", 1, Duration::from_secs(10), now);
        let boundary = now + Duration::from_secs(10);

        assert!(!entry.is_expired_at(boundary), "Entry should still be readable at boundary");
        assert!(entry.is_due_at(boundary), "Sweep should drop entry at boundary");
        assert!(entry.is_expired_at(boundary + Duration::from_nanos(1)));
    }

    #[test]
    fn test_zero_ttl_is_due_immediately() {
        let now = Instant::now();
        let entry = CacheEntry::new("k", 1, Duration::ZERO, now);

        assert!(entry.is_due_at(now));
        assert!(!entry.is_expired_at(now));
    }

    #[test]
    fn test_replace_resets_ttl_and_keeps_access_count() {
        let now = Instant::now();
        let mut entry = CacheEntry::new("k", 1, Duration::from_secs(1), now);
        entry.record_access(now);

        let later = now + Duration::from_secs(5);
        entry.replace(2, Duration::from_secs(10), later);

        assert_eq!(entry.value, 2);
        assert_eq!(entry.expires_at, later + Duration::from_secs(10));
        assert_eq!(entry.access_count, 1);
        assert!(!entry.is_expired_at(later));
    }

    #[test]
    fn test_record_access() {
        let now = Instant::now();
        let mut entry = CacheEntry::new("k", 1, Duration::from_secs(60), now);

        let later = now + Duration::from_secs(2);
        entry.record_access(later);
        entry.record_access(later);

        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.last_access, later);
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let now = Instant::now();
        let entry = CacheEntry::new("k", 1, Duration::MAX, now);

        assert!(!entry.is_expired_at(now + Duration::from_secs(60 * 60 * 24 * 365)));
    }
}
