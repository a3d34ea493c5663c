//! In-memory store configuration.

use serde::{Deserialize, Serialize};
use tablekv_common::{MAX_KEY_SIZE, MAX_VALUE_SIZE};

/// Configuration for [`MemStore`](crate::MemStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemStoreConfig {
    /// Maximum key size in bytes.
    /// Default: 16384 (16 KB)
    pub max_key_size: usize,

    /// Maximum size of a byte value in bytes.
    /// Default: 1048576 (1 MB)
    pub max_value_size: usize,
}

impl Default for MemStoreConfig {
    fn default() -> Self {
        Self {
            max_key_size: MAX_KEY_SIZE,
            max_value_size: MAX_VALUE_SIZE,
        }
    }
}

impl MemStoreConfig {
    /// Creates a configuration with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum key size.
    pub fn max_key_size(mut self, size: usize) -> Self {
        self.max_key_size = size;
        self
    }

    /// Sets the maximum value size.
    pub fn max_value_size(mut self, size: usize) -> Self {
        self.max_value_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_builder() {
        let config = MemStoreConfig::default();
        assert_eq!(config.max_key_size, 16 * 1024);
        assert_eq!(config.max_value_size, 1024 * 1024);

        let config = MemStoreConfig::new().max_key_size(64).max_value_size(128);
        assert_eq!(config.max_key_size, 64);
        assert_eq!(config.max_value_size, 128);
    }

    #[test]
    fn test_serde() {
        let config = MemStoreConfig::new().max_key_size(32);
        let json = serde_json::to_string(&config).unwrap();
        let back: MemStoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
