// Connection settings for the paper Q&A API

use serde::{Deserialize, Serialize};

/// Base URL used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

/// Configuration for [`crate::PaperApiClient`]
///
/// No whole-request timeout is applied; answers stream until the server sends `done`.
/// Callers bound an exchange by cancelling it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. "http://localhost:8000/api"
    pub base_url: String,

    /// Seconds allowed for establishing the TCP/TLS connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout_secs: None,
            user_agent: None,
        }
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.connect_timeout_secs, None);
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = ClientConfig::new("http://example.com/api/");
        assert_eq!(config.endpoint("/ask/stream"), "http://example.com/api/ask/stream");
        assert_eq!(config.endpoint("models"), "http://example.com/api/models");
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = ClientConfig::new("http://example.com/api")
            .with_connect_timeout(5)
            .with_user_agent("paperqa-test");

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ClientConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, deserialized);
    }
}
