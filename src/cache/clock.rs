//! Clock Module
//!
//! Time source used by the cache for expiration and access tracking.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

// == Clock Trait ==
/// Monotonic time source.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

// == System Clock ==
/// Real clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// == Mock Clock ==
/// Manually advanced clock for deterministic expiration tests.
///
/// Clones share the same elapsed time, so a clone handed to a cache can be
/// advanced from the test body.
///
/// ```
/// use std::time::Duration;
/// use soundtrack_cache::cache::{Clock, MockClock};
///
/// let clock = MockClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.now().duration_since(start), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Creates a mock clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock_is_frozen_until_advanced() {
        let clock = MockClock::new();
        let first = clock.now();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.now(), first);
    }

    #[test]
    fn test_mock_clock_clones_share_time() {
        let clock = MockClock::new();
        let shared = clock.clone();

        shared.advance(Duration::from_secs(30));

        assert_eq!(clock.now(), shared.now());
        assert_eq!(clock.now().duration_since(clock.start), Duration::from_secs(30));
    }
}
