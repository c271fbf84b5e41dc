use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::executor::RetryPolicy;

/// Connection settings shared by every entity client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    /// Per-request timeout; expiry surfaces as a network error
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_ms: 30_000,
            max_retries: 3,
            base_delay_ms: 500,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: ClientConfig =
            serde_json::from_value(serde_json::json!({ "base_url": "https://api.test" })).unwrap();
        assert_eq!(config.base_url, "https://api.test");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(3, Duration::from_millis(500))
        );
    }
}
