//! Dify backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::dify::{DifyChannelConfig, DEFAULT_BASE_URL};

/// Dify backend configuration
///
/// The guidance and summarizer dialogues are separate Dify applications,
/// each with its own API key.
#[derive(Debug, Clone, Deserialize)]
pub struct DifyConfig {
    /// Base URL of the Dify API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key of the guidance application
    pub guidance_api_key: Option<String>,

    /// API key of the summarizer application
    pub summarizer_api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_backoff")]
    pub retry_backoff_ms: u64,
}

impl DifyConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Channel settings for the guidance application
    pub fn guidance_channel(&self) -> Option<DifyChannelConfig> {
        self.channel(self.guidance_api_key.as_deref())
    }

    /// Channel settings for the summarizer application
    pub fn summarizer_channel(&self) -> Option<DifyChannelConfig> {
        self.channel(self.summarizer_api_key.as_deref())
    }

    fn channel(&self, api_key: Option<&str>) -> Option<DifyChannelConfig> {
        let key = api_key.filter(|k| !k.trim().is_empty())?;
        Some(
            DifyChannelConfig::new(key)
                .with_base_url(self.base_url.clone())
                .with_timeout(self.timeout())
                .with_max_retries(self.max_retries)
                .with_retry_backoff(Duration::from_millis(self.retry_backoff_ms)),
        )
    }

    /// Validate Dify configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.guidance_channel().is_none() {
            return Err(ValidationError::MissingRequired("DIFY__GUIDANCE_API_KEY"));
        }
        if self.summarizer_channel().is_none() {
            return Err(ValidationError::MissingRequired("DIFY__SUMMARIZER_API_KEY"));
        }
        Ok(())
    }
}

impl Default for DifyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            guidance_api_key: None,
            summarizer_api_key: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_backoff_ms: default_backoff(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    2
}

fn default_backoff() -> u64 {
    1000
}
