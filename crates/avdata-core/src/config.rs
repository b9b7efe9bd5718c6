//! Service configuration.
//!
//! Configuration is plain JSON with camelCase keys. Every field has a default
//! so an empty object (or no file at all) yields a working service.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::path::DEFAULT_MAX_PATH_BYTES;
use crate::record::DEFAULT_MAX_RECORD_SAMPLES;

/// Default bound on stored string values, in bytes.
pub const DEFAULT_MAX_STRING_BYTES: usize = 255;

/// Default number of pushes waiting for the management side.
pub const DEFAULT_MAX_PENDING_PUSHES: usize = 64;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Read error: {0}")]
    ReadError(#[from] std::io::Error),

    /// Configuration data is invalid.
    #[error("Invalid data: {0}")]
    InvalidData(#[from] serde_json::Error),
}

/// Limits applied by the asset data service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    /// Longest string value a writer may store.
    pub max_string_bytes: usize,

    /// Longest raw path accepted by the parser.
    pub max_path_bytes: usize,

    /// Samples a time-series record holds before it must be pushed.
    pub max_record_samples: usize,

    /// Pushes queued for the management side before new ones are refused.
    pub max_pending_pushes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_string_bytes: DEFAULT_MAX_STRING_BYTES,
            max_path_bytes: DEFAULT_MAX_PATH_BYTES,
            max_record_samples: DEFAULT_MAX_RECORD_SAMPLES,
            max_pending_pushes: DEFAULT_MAX_PENDING_PUSHES,
        }
    }
}

impl ServiceConfig {
    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_string_bytes, 255);
        assert_eq!(config.max_path_bytes, 511);
        assert_eq!(config.max_record_samples, 256);
        assert_eq!(config.max_pending_pushes, 64);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = ServiceConfig::from_json("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ServiceConfig::from_json(r#"{"maxStringBytes": 64}"#).unwrap();
        assert_eq!(config.max_string_bytes, 64);
        assert_eq!(config.max_path_bytes, 511);
    }

    #[test]
    fn test_invalid_json() {
        let err = ServiceConfig::from_json(r#"{"maxStringBytes": "lots"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidData(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ServiceConfig::load("/nonexistent/avdata.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }
}
