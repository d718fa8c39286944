// Station configuration
// Defaults match the 30 second lock lifetime and 256-bit keys

use std::time::Duration;

use serde::{Deserialize, Serialize};
use station_common::{RANDOM_BYTE_COUNT, StationError, StationResult};

/// Configuration for a station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    /// TTL used by `lock` when the caller gives none (default: 30000ms)
    #[serde(default = "default_ttl_ms")]
    pub default_ttl_ms: u64,

    /// Random bytes per capability key (default and minimum: 32)
    #[serde(default = "default_key_byte_count")]
    pub key_byte_count: usize,
}

fn default_ttl_ms() -> u64 {
    30000 // 30 seconds
}

fn default_key_byte_count() -> usize {
    RANDOM_BYTE_COUNT
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: default_ttl_ms(),
            key_byte_count: default_key_byte_count(),
        }
    }
}

impl StationConfig {
    /// Get default TTL as Duration
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn validate(&self) -> StationResult<()> {
        if self.key_byte_count < RANDOM_BYTE_COUNT {
            return Err(StationError::InvalidConfig(format!(
                "key_byte_count must be at least {}, got {}",
                RANDOM_BYTE_COUNT, self.key_byte_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StationConfig::default();
        assert_eq!(config.default_ttl(), Duration::from_secs(30));
        assert_eq!(config.key_byte_count, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let config: StationConfig = serde_json::from_str(r#"{"default_ttl_ms": 500}"#).unwrap();
        assert_eq!(config.default_ttl_ms, 500);
        assert_eq!(config.key_byte_count, RANDOM_BYTE_COUNT);

        let config: StationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StationConfig::default());
    }

    #[test]
    fn test_short_key_sizes_rejected() {
        for key_byte_count in [0, 1, RANDOM_BYTE_COUNT - 1] {
            let config = StationConfig {
                key_byte_count,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(StationError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_longer_key_sizes_accepted() {
        let config = StationConfig {
            key_byte_count: RANDOM_BYTE_COUNT * 2,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
