//! Intent status and workflow stage.
//!
//! The two fields are orthogonal: `workflow.stage` tracks forward progress
//! through the reasoning round-trip and is authoritative for progression,
//! while `status` is the user-facing lifecycle label. [`IntentStatus::permits`]
//! is the cross-field validity table that keeps them from contradicting
//! each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BriefError, Result};

/// User-facing lifecycle label of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IntentStatus {
    #[default]
    Draft,
    InProgress,
    Completed,
    Archived,
}

impl IntentStatus {
    /// Whether this status may be paired with `stage`.
    ///
    /// | status                    | permitted stages              |
    /// |---------------------------|-------------------------------|
    /// | draft                     | draft                         |
    /// | in-progress, completed    | intent-generated and later    |
    /// | archived                  | any                           |
    pub fn permits(self, stage: WorkflowStage) -> bool {
        match self {
            Self::Draft => stage == WorkflowStage::Draft,
            Self::InProgress | Self::Completed => stage >= WorkflowStage::IntentGenerated,
            Self::Archived => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IntentStatus {
    type Err = BriefError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            other => Err(BriefError::validation(format!("Unknown status '{}'", other))),
        }
    }
}

/// Forward-biased progression marker. Declaration order is progression order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStage {
    #[default]
    Draft,
    IntentGenerated,
    QuestionsReady,
    AnswersSubmitted,
    SnapshotDownloaded,
    Integrated,
}

impl WorkflowStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::IntentGenerated => "intent-generated",
            Self::QuestionsReady => "questions-ready",
            Self::AnswersSubmitted => "answers-submitted",
            Self::SnapshotDownloaded => "snapshot-downloaded",
            Self::Integrated => "integrated",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowStage {
    type Err = BriefError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "intent-generated" => Ok(Self::IntentGenerated),
            "questions-ready" => Ok(Self::QuestionsReady),
            "answers-submitted" => Ok(Self::AnswersSubmitted),
            "snapshot-downloaded" => Ok(Self::SnapshotDownloaded),
            "integrated" => Ok(Self::Integrated),
            other => Err(BriefError::validation(format!(
                "Unknown workflow stage '{}'",
                other
            ))),
        }
    }
}

/// Workflow block of the metadata document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Workflow {
    pub stage: WorkflowStage,
    /// When the stage last changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
}

impl Workflow {
    pub fn at(stage: WorkflowStage) -> Self {
        Self {
            stage,
            updated: Some(Utc::now()),
        }
    }

    /// Moves to `next`, rejecting backward transitions.
    ///
    /// Re-entering the current stage is allowed and leaves the timestamp alone.
    pub fn advance(&mut self, next: WorkflowStage) -> Result<()> {
        if next < self.stage {
            return Err(BriefError::validation(format!(
                "Workflow cannot move backward from '{}' to '{}'",
                self.stage, next
            )));
        }
        if next != self.stage {
            self.stage = next;
            self.updated = Some(Utc::now());
        }
        Ok(())
    }
}

/// Checks a status/stage pair against the validity table.
pub fn check_pair(status: IntentStatus, stage: WorkflowStage) -> Result<()> {
    if status.permits(stage) {
        Ok(())
    } else {
        Err(BriefError::validation(format!(
            "Status '{}' is not valid at workflow stage '{}'",
            status, stage
        )))
    }
}
