//! Metadata Module
//!
//! Soundtrack metadata records and the service that caches them, one TTL
//! cache per category.

mod records;
mod service;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

pub use records::{AlbumMetadata, ExternalMetadata, ExternalProvider, TrackMetadata};
pub use service::{MetadataService, MetadataStatistics};

// == Metadata Category ==
/// Kind of metadata; each category has its own cache and TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataCategory {
    /// Per-file tag data, changes most often
    Track,
    /// Album-level data aggregated from tracks
    Album,
    /// Lookups against external providers, rarely changes
    External,
}

impl MetadataCategory {
    /// Every category, in a stable order.
    pub const ALL: [MetadataCategory; 3] = [
        MetadataCategory::Track,
        MetadataCategory::Album,
        MetadataCategory::External,
    ];

    /// Lowercase name used in logs and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataCategory::Track => "track",
            MetadataCategory::Album => "album",
            MetadataCategory::External => "external",
        }
    }
}

impl fmt::Display for MetadataCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataCategory {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "track" => Ok(MetadataCategory::Track),
            "album" => Ok(MetadataCategory::Album),
            "external" => Ok(MetadataCategory::External),
            other => Err(CacheError::InvalidRequest(format!(
                "Unknown metadata category '{}'",
                other
            ))),
        }
    }
}
