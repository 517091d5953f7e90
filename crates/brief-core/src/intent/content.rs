//! Intent content and field-scoped content patches.

use serde::{Deserialize, Serialize};

/// The problem description bound to an intent.
///
/// Every field is always present; absent values deserialize to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IntentContent {
    pub problem: String,
    pub expected_output: String,
    pub current_behavior: Vec<String>,
    pub desired_behavior: Vec<String>,
    pub considerations: String,
}

impl IntentContent {
    /// All free-text fields, in document order, for token estimation.
    pub fn texts(&self) -> Vec<&str> {
        let mut texts = vec![self.problem.as_str(), self.expected_output.as_str()];
        texts.extend(self.current_behavior.iter().map(String::as_str));
        texts.extend(self.desired_behavior.iter().map(String::as_str));
        texts.push(self.considerations.as_str());
        texts
    }
}

/// A partial content update. `None` leaves the field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_behavior: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_behavior: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub considerations: Option<String>,
}

impl ContentPatch {
    pub fn problem(value: impl Into<String>) -> Self {
        Self {
            problem: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn expected_output(value: impl Into<String>) -> Self {
        Self {
            expected_output: Some(value.into()),
            ..Self::default()
        }
    }

    /// A patch that sets every field from `content`.
    pub fn full(content: &IntentContent) -> Self {
        Self {
            problem: Some(content.problem.clone()),
            expected_output: Some(content.expected_output.clone()),
            current_behavior: Some(content.current_behavior.clone()),
            desired_behavior: Some(content.desired_behavior.clone()),
            considerations: Some(content.considerations.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.problem.is_none()
            && self.expected_output.is_none()
            && self.current_behavior.is_none()
            && self.desired_behavior.is_none()
            && self.considerations.is_none()
    }

    /// Names of the fields this patch sets.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.problem.is_some() {
            names.push("problem");
        }
        if self.expected_output.is_some() {
            names.push("expected_output");
        }
        if self.current_behavior.is_some() {
            names.push("current_behavior");
        }
        if self.desired_behavior.is_some() {
            names.push("desired_behavior");
        }
        if self.considerations.is_some() {
            names.push("considerations");
        }
        names
    }

    /// Folds a later patch into this one; fields set in `later` win.
    pub fn merge(&mut self, later: ContentPatch) {
        if later.problem.is_some() {
            self.problem = later.problem;
        }
        if later.expected_output.is_some() {
            self.expected_output = later.expected_output;
        }
        if later.current_behavior.is_some() {
            self.current_behavior = later.current_behavior;
        }
        if later.desired_behavior.is_some() {
            self.desired_behavior = later.desired_behavior;
        }
        if later.considerations.is_some() {
            self.considerations = later.considerations;
        }
    }

    /// Writes the set fields over `content`, leaf by leaf.
    pub fn apply_to(&self, content: &mut IntentContent) {
        if let Some(problem) = &self.problem {
            content.problem = problem.clone();
        }
        if let Some(expected_output) = &self.expected_output {
            content.expected_output = expected_output.clone();
        }
        if let Some(current_behavior) = &self.current_behavior {
            content.current_behavior = current_behavior.clone();
        }
        if let Some(desired_behavior) = &self.desired_behavior {
            content.desired_behavior = desired_behavior.clone();
        }
        if let Some(considerations) = &self.considerations {
            content.considerations = considerations.clone();
        }
    }
}
