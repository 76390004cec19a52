//! Plot extraction tuning

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::plot::{
    HintExtractor, ReconcilerConfig, SummaryPrompt, DEFAULT_COMPLETION_MARKER, DEFAULT_GREETING,
    DEFAULT_HINT_COUNT, DEFAULT_MIN_DESCRIPTION_CHARS,
};

/// Plot extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Number of trailing words offered as hints
    #[serde(default = "default_hint_count")]
    pub hint_count: usize,

    /// Conflict/goal captures shorter than this are treated as unknown
    #[serde(default = "default_min_description_chars")]
    pub min_description_chars: usize,

    /// Word the summarizer writes once every field is clear
    #[serde(default = "default_completion_marker")]
    pub completion_marker: String,

    /// Send only the student's turns to the summarizer
    #[serde(default = "default_user_turns_only")]
    pub summarize_user_turns_only: bool,

    /// Agent text used when the opening reply is empty
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl ExtractionConfig {
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            min_description_chars: self.min_description_chars,
            completion_marker: self.completion_marker.clone(),
        }
    }

    pub fn hint_extractor(&self) -> HintExtractor {
        HintExtractor::new(self.hint_count)
    }

    pub fn summary_prompt(&self) -> SummaryPrompt {
        SummaryPrompt::new(self.summarize_user_turns_only, self.completion_marker.clone())
    }

    /// Validate extraction configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hint_count == 0 {
            return Err(ValidationError::InvalidHintCount);
        }
        if self.completion_marker.trim().is_empty() {
            return Err(ValidationError::InvalidCompletionMarker);
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            hint_count: default_hint_count(),
            min_description_chars: default_min_description_chars(),
            completion_marker: default_completion_marker(),
            summarize_user_turns_only: default_user_turns_only(),
            greeting: default_greeting(),
        }
    }
}

fn default_hint_count() -> usize {
    DEFAULT_HINT_COUNT
}

fn default_min_description_chars() -> usize {
    DEFAULT_MIN_DESCRIPTION_CHARS
}

fn default_completion_marker() -> String {
    DEFAULT_COMPLETION_MARKER.to_string()
}

fn default_user_turns_only() -> bool {
    true
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.hint_count, 6);
        assert_eq!(config.min_description_chars, 3);
        assert_eq!(config.completion_marker, "done");
        assert!(config.summarize_user_turns_only);
        assert_eq!(config.greeting, "Hello! Let's start brainstorming your plot.");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builds_domain_settings() {
        let config = ExtractionConfig {
            hint_count: 4,
            min_description_chars: 8,
            completion_marker: "finished".to_string(),
            ..Default::default()
        };
        assert_eq!(config.hint_extractor().trailer_size(), 4);
        assert_eq!(config.reconciler_config().min_description_chars, 8);
        assert_eq!(config.reconciler_config().completion_marker, "finished");
    }

    #[test]
    fn test_validation_errors() {
        let no_hints = ExtractionConfig {
            hint_count: 0,
            ..Default::default()
        };
        assert_eq!(no_hints.validate(), Err(ValidationError::InvalidHintCount));

        let blank_marker = ExtractionConfig {
            completion_marker: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(blank_marker.validate(), Err(ValidationError::InvalidCompletionMarker));
    }
}
