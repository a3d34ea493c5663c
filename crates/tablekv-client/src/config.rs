//! Client configuration.

use serde::{Deserialize, Serialize};
use tablekv_common::DEFAULT_NAMESPACE_ID;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Namespace the table catalog lives in.
    /// Default: 0
    pub namespace_id: u32,

    /// Maximum number of primitive calls in one batch. `None` is unlimited.
    /// Default: None
    pub max_batch_calls: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            namespace_id: DEFAULT_NAMESPACE_ID,
            max_batch_calls: None,
        }
    }
}

impl ClientConfig {
    /// Creates a new client configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the catalog namespace.
    pub fn namespace_id(mut self, namespace_id: u32) -> Self {
        self.namespace_id = namespace_id;
        self
    }

    /// Limits the number of calls per batch.
    pub fn max_batch_calls(mut self, max: usize) -> Self {
        self.max_batch_calls = Some(max);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_batch_calls == Some(0) {
            return Err("max_batch_calls must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.namespace_id, 0);
        assert_eq!(config.max_batch_calls, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validate() {
        let config = ClientConfig::new().namespace_id(3).max_batch_calls(10);
        assert_eq!(config.namespace_id, 3);
        assert_eq!(config.max_batch_calls, Some(10));
        assert!(config.validate().is_ok());

        assert!(ClientConfig::new().max_batch_calls(0).validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: ClientConfig = serde_json::from_str(r#"{"namespace_id": 7}"#).unwrap();
        assert_eq!(config.namespace_id, 7);
        assert_eq!(config.max_batch_calls, None);
    }
}
