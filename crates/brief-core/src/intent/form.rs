//! Form data submitted when an intent is generated, and the primary
//! content document rendered from it.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use super::content::IntentContent;
use super::name::{display_name, validate_name};
use crate::error::{BriefError, Result};

/// Caller-supplied data for `generate_intent` / `regenerate_intent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IntentFormData {
    pub name: String,
    pub problem: String,
    pub expected_output: String,
    pub current_behavior: Vec<String>,
    pub desired_behavior: Vec<String>,
    pub considerations: String,
}

impl IntentFormData {
    /// Rejects a form whose name is not a slug or whose required fields are blank.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.problem.trim().is_empty() {
            return Err(BriefError::validation("Problem must not be empty"));
        }
        if self.expected_output.trim().is_empty() {
            return Err(BriefError::validation("Expected output must not be empty"));
        }
        Ok(())
    }

    pub fn content(&self) -> IntentContent {
        IntentContent {
            problem: self.problem.clone(),
            expected_output: self.expected_output.clone(),
            current_behavior: non_blank(&self.current_behavior),
            desired_behavior: non_blank(&self.desired_behavior),
            considerations: self.considerations.clone(),
        }
    }

    /// Renders the markdown body of `intent.md`.
    pub fn render_document(&self) -> String {
        render_intent_document(&display_name(&self.name), &self.content())
    }
}

fn non_blank(steps: &[String]) -> Vec<String> {
    steps
        .iter()
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .collect()
}

/// Renders the primary content document for `title` and `content`.
pub fn render_intent_document(title: &str, content: &IntentContent) -> String {
    let mut doc = String::new();
    let _ = writeln!(doc, "# {}\n", title);

    let _ = writeln!(doc, "## Problem\n\n{}\n", content.problem.trim_end());

    if !content.current_behavior.is_empty() {
        doc.push_str("## Current Behavior\n\n");
        for (i, step) in content.current_behavior.iter().enumerate() {
            let _ = writeln!(doc, "{}. {}", i + 1, step);
        }
        doc.push('\n');
    }

    if !content.desired_behavior.is_empty() {
        doc.push_str("## Desired Behavior\n\n");
        for (i, step) in content.desired_behavior.iter().enumerate() {
            let _ = writeln!(doc, "{}. {}", i + 1, step);
        }
        doc.push('\n');
    }

    let _ = writeln!(
        doc,
        "## Expected Output\n\n{}\n",
        content.expected_output.trim_end()
    );

    if !content.considerations.trim().is_empty() {
        let _ = writeln!(
            doc,
            "## Considerations\n\n{}\n",
            content.considerations.trim_end()
        );
    }

    doc
}
