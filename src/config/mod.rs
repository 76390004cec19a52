//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PLOT_BRAINSTORM` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use plot_brainstorm::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Talking to {}", config.dify.base_url);
//! ```

mod dify;
mod error;
mod extraction;
mod logging;
mod student;

pub use dify::DifyConfig;
pub use error::{ConfigError, ValidationError};
pub use extraction::ExtractionConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use student::StudentConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Dify backend (base URL, per-channel API keys, retries)
    #[serde(default)]
    pub dify: DifyConfig,

    /// Hint, reconciliation and summary prompt tuning
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Participant and upstream character
    #[serde(default)]
    pub student: StudentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PLOT_BRAINSTORM` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PLOT_BRAINSTORM__DIFY__GUIDANCE_API_KEY=app-...` -> `dify.guidance_api_key`
    /// - `PLOT_BRAINSTORM__EXTRACTION__HINT_COUNT=6` -> `extraction.hint_count = 6`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PLOT_BRAINSTORM")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.dify.validate()?;
        self.extraction.validate()?;
        self.logging.validate()?;
        self.student.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("PLOT_BRAINSTORM__DIFY__GUIDANCE_API_KEY", "app-guide");
        env::set_var("PLOT_BRAINSTORM__DIFY__SUMMARIZER_API_KEY", "app-summary");
    }

    fn clear_env() {
        env::remove_var("PLOT_BRAINSTORM__DIFY__GUIDANCE_API_KEY");
        env::remove_var("PLOT_BRAINSTORM__DIFY__SUMMARIZER_API_KEY");
        env::remove_var("PLOT_BRAINSTORM__DIFY__BASE_URL");
        env::remove_var("PLOT_BRAINSTORM__EXTRACTION__HINT_COUNT");
        env::remove_var("PLOT_BRAINSTORM__EXTRACTION__SUMMARIZE_USER_TURNS_ONLY");
        env::remove_var("PLOT_BRAINSTORM__LOGGING__FORMAT");
        env::remove_var("PLOT_BRAINSTORM__STUDENT__CHARACTER_NAME");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.dify.guidance_api_key.as_deref(), Some("app-guide"));
        assert_eq!(config.dify.summarizer_api_key.as_deref(), Some("app-summary"));
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_keys_fail_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("DIFY__GUIDANCE_API_KEY"))
        );
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PLOT_BRAINSTORM__DIFY__BASE_URL", "http://localhost:5001/v1");
        env::set_var("PLOT_BRAINSTORM__EXTRACTION__HINT_COUNT", "4");
        env::set_var("PLOT_BRAINSTORM__EXTRACTION__SUMMARIZE_USER_TURNS_ONLY", "false");
        env::set_var("PLOT_BRAINSTORM__LOGGING__FORMAT", "json");
        env::set_var("PLOT_BRAINSTORM__STUDENT__CHARACTER_NAME", "Pip");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.dify.base_url, "http://localhost:5001/v1");
        assert_eq!(config.extraction.hint_count, 4);
        assert!(!config.extraction.summarize_user_turns_only);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.student.character().unwrap().name, "Pip");
    }
}
