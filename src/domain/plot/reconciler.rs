//! Field reconciliation over summarizer output.
//!
//! The summarizer answers in loosely formatted text such as
//!
//! ```text
//! setting: a floating library
//! conflict: the books are disappearing one by one
//! goal: to find the thief and bring the stories back
//! done
//! ```
//!
//! Extraction is best-effort label matching. Merging follows the
//! monotonic-improvement rule: a field only ever moves towards more
//! specificity, so a sloppy later answer cannot erase an earlier good one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::structured::{FieldValue, PlotField, StructuredPlot, UNKNOWN};
use crate::domain::foundation::ValidationError;

/// Shortest conflict or goal accepted as a real description.
pub const DEFAULT_MIN_DESCRIPTION_CHARS: usize = 3;

/// Token the summarizer emits once all three fields are settled.
pub const DEFAULT_COMPLETION_MARKER: &str = "done";

static SETTING_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsetting\**\s*[:：]").expect("valid setting label pattern"));
static CONFLICT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bconflict\**\s*[:：]").expect("valid conflict label pattern"));
static GOAL_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bgoal\**\s*[:：]").expect("valid goal label pattern"));
static ANY_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:setting|conflict|goal)\**\s*[:：]").expect("valid label pattern")
});

// Same labels anchored at the start of a line, optionally behind list or
// bold markers.
static SETTING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t*\-]*setting\**\s*[:：]").expect("valid setting line pattern")
});
static CONFLICT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t*\-]*conflict\**\s*[:：]").expect("valid conflict line pattern")
});
static GOAL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t*\-]*goal\**\s*[:：]").expect("valid goal line pattern")
});

fn label_pattern(field: PlotField) -> &'static Regex {
    match field {
        PlotField::Setting => &SETTING_LABEL,
        PlotField::Conflict => &CONFLICT_LABEL,
        PlotField::Goal => &GOAL_LABEL,
    }
}

fn line_label_pattern(field: PlotField) -> &'static Regex {
    match field {
        PlotField::Setting => &SETTING_LINE,
        PlotField::Conflict => &CONFLICT_LINE,
        PlotField::Goal => &GOAL_LINE,
    }
}

/// Result of reconciling one summarizer answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Plot after merging.
    pub plot: StructuredPlot,
    /// Fields that received a new concrete value.
    pub updated: Vec<PlotField>,
    /// Whether the answer carried the completion marker.
    pub completion_marker_seen: bool,
}

/// Strategy turning summarizer text into plot fields.
///
/// The label-matching implementation can be swapped for a stricter
/// structured-output contract without touching the controller.
pub trait FieldExtractor: Send + Sync {
    /// Merges the fields found in `text` into `prior`.
    fn extract_fields(&self, text: &str, prior: &StructuredPlot) -> Reconciliation;
}

/// Tuning for [`LabelledFieldReconciler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Conflict/goal captures shorter than this become `unknown`.
    pub min_description_chars: usize,
    /// Completion marker, matched case-insensitively as a whole word.
    pub completion_marker: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            min_description_chars: DEFAULT_MIN_DESCRIPTION_CHARS,
            completion_marker: DEFAULT_COMPLETION_MARKER.to_string(),
        }
    }
}

/// Extracts `label: value` lines and merges them monotonically.
#[derive(Debug, Clone)]
pub struct LabelledFieldReconciler {
    config: ReconcilerConfig,
    marker: Regex,
}

impl LabelledFieldReconciler {
    /// Creates a reconciler, compiling the completion marker.
    pub fn new(config: ReconcilerConfig) -> Result<Self, ValidationError> {
        let marker = config.completion_marker.trim();
        if marker.is_empty() {
            return Err(ValidationError::empty_field("completion_marker"));
        }

        let escaped = regex::escape(marker);
        let starts_word = marker.chars().next().is_some_and(|c| c.is_alphanumeric());
        let ends_word = marker.chars().last().is_some_and(|c| c.is_alphanumeric());
        let pattern = format!(
            "(?i){}{}{}",
            if starts_word { r"\b" } else { "" },
            escaped,
            if ends_word { r"\b" } else { "" },
        );
        let marker = Regex::new(&pattern)
            .map_err(|e| ValidationError::invalid_format("completion_marker", e.to_string()))?;

        Ok(Self { config, marker })
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Captures the raw text following a field's label.
    ///
    /// A label opening a line wins over the same word inside another
    /// field's value; an in-line label is used only when no line starts
    /// with it. The capture runs to the end of the label's line or the next
    /// label, whichever comes first. Returns `None` when the label is absent
    /// or nothing follows it.
    pub fn capture(&self, text: &str, field: PlotField) -> Option<String> {
        let label = label_pattern(field);
        let found = line_label_pattern(field)
            .find(text)
            .or_else(|| label.find(text))?;

        let rest = text[found.end()..].trim_start_matches(|c: char| c == '*' || c.is_whitespace());
        let mut line = rest.split(|c: char| c == '\n' || c == '\r').next().unwrap_or_default().trim();

        // "setting: setting: forest"
        if let Some(repeat) = label.find(line) {
            if repeat.start() == 0 {
                line = line[repeat.end()..].trim_start_matches(|c: char| c == '*' || c.is_whitespace());
            }
        }

        let end = ANY_LABEL.find(line).map_or(line.len(), |m| m.start());
        let value = line[..end].trim();

        (!value.is_empty()).then(|| value.to_string())
    }

    /// Validates a capture into a candidate value.
    pub fn classify(&self, field: PlotField, captured: &str) -> FieldValue {
        // "Unknown.", "(unknown)"
        let bare = captured.trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
        if bare.eq_ignore_ascii_case(UNKNOWN) {
            return FieldValue::Unknown;
        }
        if field.requires_description()
            && captured.chars().count() < self.config.min_description_chars
        {
            return FieldValue::Unknown;
        }
        FieldValue::Concrete(captured.to_string())
    }

    /// Returns true if the text carries the completion marker.
    pub fn signals_completion(&self, text: &str) -> bool {
        self.marker.is_match(text)
    }

    /// Merges every field found in `text` into `current`.
    pub fn reconcile(&self, text: &str, current: &StructuredPlot) -> Reconciliation {
        let mut plot = current.clone();
        let mut updated = Vec::new();

        for field in PlotField::ALL {
            let Some(captured) = self.capture(text, field) else {
                continue;
            };
            let candidate = self.classify(field, &captured);
            if merge(plot.get_mut(field), candidate) {
                updated.push(field);
            }
        }

        Reconciliation {
            plot,
            updated,
            completion_marker_seen: self.signals_completion(text),
        }
    }
}

impl FieldExtractor for LabelledFieldReconciler {
    fn extract_fields(&self, text: &str, prior: &StructuredPlot) -> Reconciliation {
        self.reconcile(text, prior)
    }
}

/// Applies a candidate to a field. Returns true on a new concrete value.
fn merge(slot: &mut FieldValue, candidate: FieldValue) -> bool {
    match candidate {
        FieldValue::Concrete(value) => {
            if slot.as_concrete() == Some(value.as_str()) {
                return false;
            }
            *slot = FieldValue::Concrete(value);
            true
        }
        FieldValue::Unknown if slot.is_concrete() => {
            tracing::debug!(current = ?slot, "Ignoring unknown for an already concrete field");
            false
        }
        FieldValue::Unknown => {
            *slot = FieldValue::Unknown;
            false
        }
        FieldValue::Unset => false,
    }
}
