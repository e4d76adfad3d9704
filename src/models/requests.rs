//! Request DTOs for the diagnostics API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::config::Settings;

/// Longest TTL accepted from the API: one year.
const MAX_TTL_HOURS: u64 = 24 * 365;

/// Request body for PUT /settings
///
/// Every field is optional; omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSettingsRequest {
    pub max_entries: Option<usize>,
    pub track_ttl_hours: Option<u64>,
    pub album_ttl_hours: Option<u64>,
    pub external_ttl_hours: Option<u64>,
    pub cleanup_interval_secs: Option<u64>,
    pub enable_memory_pressure: Option<bool>,
    pub memory_threshold_mb: Option<u64>,
    pub enable_cache_warming: Option<bool>,
}

impl UpdateSettingsRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.max_entries == Some(0) {
            return Some("max_entries must be greater than zero".to_string());
        }
        if self.cleanup_interval_secs == Some(0) {
            return Some("cleanup_interval_secs must be greater than zero".to_string());
        }
        let ttls = [
            ("track_ttl_hours", self.track_ttl_hours),
            ("album_ttl_hours", self.album_ttl_hours),
            ("external_ttl_hours", self.external_ttl_hours),
        ];
        for (name, hours) in ttls {
            if hours.is_some_and(|h| h > MAX_TTL_HOURS) {
                return Some(format!("{} exceeds maximum of {} hours", name, MAX_TTL_HOURS));
            }
        }
        None
    }

    /// Returns `current` with the requested fields replaced.
    ///
    /// The server port cannot be changed at runtime.
    pub fn apply_to(&self, current: &Settings) -> Settings {
        Settings {
            max_entries: self.max_entries.unwrap_or(current.max_entries),
            track_ttl_hours: self.track_ttl_hours.unwrap_or(current.track_ttl_hours),
            album_ttl_hours: self.album_ttl_hours.unwrap_or(current.album_ttl_hours),
            external_ttl_hours: self.external_ttl_hours.unwrap_or(current.external_ttl_hours),
            cleanup_interval_secs: self
                .cleanup_interval_secs
                .unwrap_or(current.cleanup_interval_secs),
            enable_memory_pressure: self
                .enable_memory_pressure
                .unwrap_or(current.enable_memory_pressure),
            memory_threshold_mb: self.memory_threshold_mb.unwrap_or(current.memory_threshold_mb),
            enable_cache_warming: self
                .enable_cache_warming
                .unwrap_or(current.enable_cache_warming),
            server_port: current.server_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_request_deserialize() {
        let json = r#"{"max_entries": 200}"#;
        let req: UpdateSettingsRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.max_entries, Some(200));
        assert!(req.track_ttl_hours.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"server_port": 9000}"#;
        assert!(serde_json::from_str::<UpdateSettingsRequest>(json).is_err());
    }

    #[test]
    fn test_apply_keeps_unset_fields() {
        let current = Settings::default();
        let req = UpdateSettingsRequest {
            album_ttl_hours: Some(48),
            enable_memory_pressure: Some(false),
            ..Default::default()
        };

        let updated = req.apply_to(&current);
        assert_eq!(updated.album_ttl_hours, 48);
        assert!(!updated.enable_memory_pressure);
        assert_eq!(updated.max_entries, current.max_entries);
        assert_eq!(updated.server_port, current.server_port);
    }

    #[test]
    fn test_validate_zero_entries() {
        let req = UpdateSettingsRequest {
            max_entries: Some(0),
            ..Default::default()
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_ttl_limit() {
        let req = UpdateSettingsRequest {
            external_ttl_hours: Some(MAX_TTL_HOURS + 1),
            ..Default::default()
        };
        let msg = req.validate().unwrap();
        assert!(msg.contains("external_ttl_hours"));
    }

    #[test]
    fn test_validate_empty_request() {
        assert!(UpdateSettingsRequest::default().validate().is_none());
    }
}
