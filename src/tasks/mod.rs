//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is alive.
//!
//! # Tasks
//! - Cache maintenance: removes expired entries and re-checks memory
//!   pressure at the configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
