//! Structured plot fields and the stage completion gate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal the summarizer uses for a field it cannot determine yet.
pub const UNKNOWN: &str = "unknown";

/// The three plot fields, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotField {
    Setting,
    Conflict,
    Goal,
}

impl PlotField {
    /// All fields in canonical order.
    pub const ALL: [PlotField; 3] = [PlotField::Setting, PlotField::Conflict, PlotField::Goal];

    /// The label the summarizer writes before the value.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Setting => "setting",
            Self::Conflict => "conflict",
            Self::Goal => "goal",
        }
    }

    /// Returns true if a value must be a full description rather than a
    /// single word.
    pub fn requires_description(&self) -> bool {
        matches!(self, Self::Conflict | Self::Goal)
    }
}

impl fmt::Display for PlotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status and value of one plot field.
///
/// Ordered by specificity: `Unset < Unknown < Concrete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Nothing extracted yet.
    #[default]
    Unset,
    /// The summarizer looked but could not determine it.
    Unknown,
    /// A usable value.
    Concrete(String),
}

impl FieldValue {
    /// Returns true if the field holds a usable value.
    pub fn is_concrete(&self) -> bool {
        matches!(self, Self::Concrete(_))
    }

    /// The concrete value, if any.
    pub fn as_concrete(&self) -> Option<&str> {
        match self {
            Self::Concrete(value) => Some(value),
            _ => None,
        }
    }

    /// Rank used by the monotonic-improvement rule.
    pub fn specificity(&self) -> u8 {
        match self {
            Self::Unset => 0,
            Self::Unknown => 1,
            Self::Concrete(_) => 2,
        }
    }

    /// Text shown in a progress panel.
    pub fn display(&self) -> &str {
        self.as_concrete().unwrap_or(UNKNOWN)
    }
}

/// The plot being brainstormed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPlot {
    setting: FieldValue,
    conflict: FieldValue,
    goal: FieldValue,
}

impl StructuredPlot {
    /// Creates a plot with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a plot from known field values.
    pub fn with_values(setting: FieldValue, conflict: FieldValue, goal: FieldValue) -> Self {
        Self {
            setting,
            conflict,
            goal,
        }
    }

    /// Value of a field.
    pub fn get(&self, field: PlotField) -> &FieldValue {
        match field {
            PlotField::Setting => &self.setting,
            PlotField::Conflict => &self.conflict,
            PlotField::Goal => &self.goal,
        }
    }

    pub fn setting(&self) -> &FieldValue {
        &self.setting
    }

    pub fn conflict(&self) -> &FieldValue {
        &self.conflict
    }

    pub fn goal(&self) -> &FieldValue {
        &self.goal
    }

    pub(super) fn get_mut(&mut self, field: PlotField) -> &mut FieldValue {
        match field {
            PlotField::Setting => &mut self.setting,
            PlotField::Conflict => &mut self.conflict,
            PlotField::Goal => &mut self.goal,
        }
    }

    /// Fields that do not yet hold a concrete value.
    pub fn missing_fields(&self) -> Vec<PlotField> {
        PlotField::ALL
            .into_iter()
            .filter(|f| !self.get(*f).is_concrete())
            .collect()
    }

    /// Returns true if all three fields are concrete.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// The plain-text plot, if complete.
    pub fn to_completed(&self) -> Option<CompletedPlot> {
        Some(CompletedPlot {
            setting: self.setting.as_concrete()?.to_string(),
            conflict: self.conflict.as_concrete()?.to_string(),
            goal: self.goal.as_concrete()?.to_string(),
        })
    }
}

/// Plot handed to the next stage once the gate opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPlot {
    pub setting: String,
    pub conflict: String,
    pub goal: String,
}

/// Sticky flag raised when the summarizer reports it has everything.
///
/// It cannot be lowered; resetting the session replaces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSignal(bool);

impl CompletionSignal {
    /// Raises the signal.
    pub fn raise(&mut self) {
        self.0 = true;
    }

    pub fn is_raised(&self) -> bool {
        self.0
    }
}

/// Why the stage cannot advance yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "fields", rename_all = "snake_case")]
pub enum GateStatus {
    /// Completion signal raised and every field concrete.
    Open,
    /// The summarizer has not said it is done.
    SummaryPending,
    /// Signal raised, but these fields are not concrete.
    FieldsIncomplete(Vec<PlotField>),
}

impl GateStatus {
    /// Evaluates the gate for a plot and signal.
    pub fn evaluate(plot: &StructuredPlot, signal: CompletionSignal) -> Self {
        if !signal.is_raised() {
            return Self::SummaryPending;
        }
        let missing = plot.missing_fields();
        if missing.is_empty() {
            Self::Open
        } else {
            Self::FieldsIncomplete(missing)
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}
