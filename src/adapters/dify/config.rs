//! Connection settings for a Dify chat application.

use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Default Dify cloud endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.dify.ai/v1";

/// Configuration for one Dify-backed channel.
///
/// Each channel is a separate Dify application with its own key.
#[derive(Debug, Clone)]
pub struct DifyChannelConfig {
    /// Application API key.
    api_key: Secret<String>,
    /// Base URL of the API, without trailing slash.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on each further attempt.
    pub retry_backoff: Duration,
}

impl DifyChannelConfig {
    /// Creates a configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
            retry_backoff: Duration::from_secs(1),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the initial retry delay.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Delay before retry number `attempt` (zero based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff.saturating_mul(1u32 << attempt.min(16))
    }

    /// Exposes the API key (for making requests).
    pub(super) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_works() {
        let config = DifyChannelConfig::new("app-key")
            .with_base_url("https://dify.internal/v1/")
            .with_timeout(Duration::from_secs(30))
            .with_max_retries(5)
            .with_retry_backoff(Duration::from_millis(200));

        assert_eq!(config.base_url, "https://dify.internal/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.api_key(), "app-key");
    }

    #[test]
    fn backoff_doubles() {
        let config = DifyChannelConfig::new("k").with_retry_backoff(Duration::from_millis(100));
        assert_eq!(config.backoff_for(0), Duration::from_millis(100));
        assert_eq!(config.backoff_for(1), Duration::from_millis(200));
        assert_eq!(config.backoff_for(3), Duration::from_millis(800));
    }

    #[test]
    fn debug_output_hides_key() {
        let config = DifyChannelConfig::new("super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
