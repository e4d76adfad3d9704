//! Metadata records stored in the category caches.

use serde::{Deserialize, Serialize};

/// Tag data read from a single soundtrack file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
    pub year: Option<u32>,
    pub duration_secs: Option<u64>,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Album-level data for a game's soundtrack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumMetadata {
    pub title: String,
    pub artist: Option<String>,
    pub year: Option<u32>,
    pub track_count: Option<u32>,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// External metadata source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalProvider {
    Discogs,
    MusicBrainz,
}

/// Result of a lookup against an external provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalMetadata {
    pub provider: ExternalProvider,
    /// Provider-side identifier (release id, MBID)
    pub external_id: String,
    pub title: String,
    pub artist: Option<String>,
    pub year: Option<u32>,
    pub url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_provider_serializes_lowercase() {
        let record = ExternalMetadata {
            provider: ExternalProvider::MusicBrainz,
            external_id: "b1a9c0e9".to_string(),
            title: "Chrono Trigger OST".to_string(),
            artist: Some("Yasunori Mitsuda".to_string()),
            year: Some(1995),
            url: None,
            genres: vec!["Soundtrack".to_string()],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["provider"], "musicbrainz");
        assert_eq!(json["year"], 1995);
    }

    #[test]
    fn test_track_genres_default_when_missing() {
        let track: TrackMetadata = serde_json::from_str(r#"{"title":"Corridors of Time"}"#).unwrap();
        assert!(track.genres.is_empty());
        assert!(track.artist.is_none());
    }
}
