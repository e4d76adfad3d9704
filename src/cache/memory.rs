//! Memory Pressure Module
//!
//! Samples the resident memory of the current process so the cache can
//! shrink its capacity while the host is under pressure.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::{CacheError, Result};

// == Memory Probe ==
/// Source of the process's resident memory, in bytes.
pub trait MemoryProbe: Send + Sync {
    /// Returns the current resident set size in bytes.
    fn resident_bytes(&self) -> Result<u64>;
}

// == Memory Pressure ==
/// Outcome of one memory-pressure check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPressure {
    /// Adjustment is turned off in the configuration
    Disabled,
    /// Usage at or below the threshold; full capacity applies
    Normal,
    /// Usage above the threshold; reduced capacity applies
    High,
}

// == Process Memory Probe ==
/// Reads the current process's resident memory through `sysinfo`.
pub struct ProcessMemoryProbe {
    pid: Pid,
    system: Mutex<System>,
}

impl ProcessMemoryProbe {
    /// Creates a probe bound to the current process.
    pub fn new() -> Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| CacheError::MemoryProbe(e.to_string()))?;
        Ok(Self {
            pid,
            system: Mutex::new(System::new()),
        })
    }
}

impl fmt::Debug for ProcessMemoryProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessMemoryProbe")
            .field("pid", &self.pid)
            .finish()
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    fn resident_bytes(&self) -> Result<u64> {
        let mut system = self.system.lock();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        system
            .process(self.pid)
            .map(|process| process.memory())
            .ok_or_else(|| {
                CacheError::MemoryProbe(format!("process {} not visible", self.pid))
            })
    }
}

// == Manual Memory Probe ==
/// Probe reporting whatever value was last set; used to drive pressure
/// transitions in tests and embedders that measure memory themselves.
#[derive(Debug, Default)]
pub struct ManualMemoryProbe {
    bytes: AtomicU64,
}

impl ManualMemoryProbe {
    /// Creates a probe reporting `bytes`.
    pub fn new(bytes: u64) -> Self {
        Self {
            bytes: AtomicU64::new(bytes),
        }
    }

    /// Changes the reported value.
    pub fn set(&self, bytes: u64) {
        self.bytes.store(bytes, Ordering::Relaxed);
    }
}

impl MemoryProbe for ManualMemoryProbe {
    fn resident_bytes(&self) -> Result<u64> {
        Ok(self.bytes.load(Ordering::Relaxed))
    }
}
