//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStatistics;
use crate::config::Settings;
use crate::metadata::{MetadataCategory, MetadataStatistics};

/// Response body for GET /metadata/:category/:key
#[derive(Debug, Clone, Serialize)]
pub struct MetadataResponse {
    pub category: MetadataCategory,
    pub key: String,
    /// The cached record, shaped by its category
    pub record: serde_json::Value,
}

impl MetadataResponse {
    /// Creates a new MetadataResponse
    pub fn new(category: MetadataCategory, key: impl Into<String>, record: serde_json::Value) -> Self {
        Self {
            category,
            key: key.into(),
            record,
        }
    }
}

/// Response body for DELETE /metadata/:category/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    pub category: MetadataCategory,
    /// The key that was removed
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(category: MetadataCategory, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("{} entry '{}' removed", category, key),
            category,
            key,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "All metadata caches cleared".to_string(),
        }
    }
}

/// Response body for PUT /settings
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub message: String,
    /// Settings now in effect
    pub settings: Settings,
}

impl SettingsResponse {
    pub fn applied(settings: Settings) -> Self {
        Self {
            message: "Settings applied; caches rebuilt".to_string(),
            settings,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Entries across all categories
    pub total_entries: usize,
    /// Hit ratio across all categories
    pub hit_ratio: f64,
    /// Per-category statistics
    pub categories: MetadataStatistics,
}

impl StatsResponse {
    /// Creates a new StatsResponse from per-category statistics
    pub fn new(categories: MetadataStatistics) -> Self {
        let all: [&CacheStatistics; 3] =
            [&categories.track, &categories.album, &categories.external];
        let total_entries = all.iter().map(|s| s.current_size).sum();
        let hits: u64 = all.iter().map(|s| s.hits).sum();
        let requests: u64 = all.iter().map(|s| s.total_requests).sum();
        let hit_ratio = if requests > 0 {
            hits as f64 / requests as f64
        } else {
            0.0
        };
        Self {
            total_entries,
            hit_ratio,
            categories,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
