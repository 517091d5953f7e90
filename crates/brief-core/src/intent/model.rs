//! The structured metadata document persisted per intent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{ContentPatch, IntentContent};
use super::state::{IntentStatus, Workflow};
use crate::tokens::TokenStats;

/// Schema tag written into every metadata document.
pub const METADATA_VERSION: &str = "1.0.0";

/// De-duplicated, order-preserving list of workspace-relative paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilesBlock {
    pub paths: Vec<String>,
    /// Sum of the files' sizes at the last recompute
    pub total_size: u64,
}

impl FilesBlock {
    pub fn new(paths: Vec<String>) -> Self {
        let mut block = Self::default();
        block.insert_all(paths);
        block
    }

    /// Appends paths not already present. Returns how many were added.
    pub fn insert_all(&mut self, paths: impl IntoIterator<Item = String>) -> usize {
        let before = self.paths.len();
        for path in paths {
            if !self.paths.contains(&path) {
                self.paths.push(path);
            }
        }
        self.paths.len() - before
    }

    /// Removes `path`. Returns whether it was present.
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        self.paths.len() != before
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// How often an intent has been reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OpenStats {
    pub opens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened: Option<DateTime<Utc>>,
}

/// The `.metadata` document: the on-disk source of truth for an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub version: String,
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub status: IntentStatus,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub workflow: Workflow,
    #[serde(default)]
    pub files: FilesBlock,
    #[serde(default)]
    pub content: IntentContent,
    #[serde(default)]
    pub tokens: TokenStats,
    #[serde(default)]
    pub stats: OpenStats,
}

impl IntentMetadata {
    /// Stamps `updated`, never moving it backward.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated {
            self.updated = now;
        }
    }

    /// Applies a field-scoped patch. Does not touch `updated`.
    pub fn apply(&mut self, patch: &MetadataPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(display_name) = &patch.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(workflow) = patch.workflow {
            self.workflow = workflow;
        }
        if let Some(files) = &patch.files {
            self.files = files.clone();
        }
        if let Some(content) = &patch.content {
            content.apply_to(&mut self.content);
        }
        if let Some(tokens) = patch.tokens {
            self.tokens = tokens;
        }
        if let Some(stats) = patch.stats {
            self.stats = stats;
        }
    }
}

/// Initial values for a freshly created metadata document.
#[derive(Debug, Clone, Default)]
pub struct NewIntent {
    pub name: String,
    pub display_name: String,
    pub status: IntentStatus,
    pub workflow: Workflow,
    pub files: FilesBlock,
    pub content: IntentContent,
    pub tokens: TokenStats,
}

/// A partial update of the metadata document.
///
/// Each top-level field is optional. `content` is merged leaf by leaf;
/// `files`, `workflow`, `tokens` and `stats` are replaced as whole values.
#[derive(Debug, Clone, Default)]
pub struct MetadataPatch {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub status: Option<IntentStatus>,
    pub workflow: Option<Workflow>,
    pub files: Option<FilesBlock>,
    pub content: Option<ContentPatch>,
    pub tokens: Option<TokenStats>,
    pub stats: Option<OpenStats>,
}

impl MetadataPatch {
    pub fn files(files: FilesBlock) -> Self {
        Self {
            files: Some(files),
            ..Self::default()
        }
    }

    pub fn content(content: ContentPatch) -> Self {
        Self {
            content: Some(content),
            ..Self::default()
        }
    }

    pub fn status(status: IntentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn workflow(workflow: Workflow) -> Self {
        Self {
            workflow: Some(workflow),
            ..Self::default()
        }
    }

    pub fn with_tokens(mut self, tokens: TokenStats) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::state::WorkflowStage;

    fn metadata() -> IntentMetadata {
        let now = Utc::now();
        IntentMetadata {
            version: METADATA_VERSION.to_string(),
            id: "id-1".into(),
            name: "fix-bug".into(),
            display_name: "Fix Bug".into(),
            status: IntentStatus::Completed,
            created: now,
            updated: now,
            workflow: Workflow::at(WorkflowStage::IntentGenerated),
            files: FilesBlock::new(vec!["a.x".into(), "b.x".into()]),
            content: IntentContent {
                problem: "P".into(),
                expected_output: "E".into(),
                ..Default::default()
            },
            tokens: TokenStats::default(),
            stats: OpenStats::default(),
        }
    }

    #[test]
    fn test_files_block_has_set_semantics() {
        let mut files = FilesBlock::new(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(files.paths, vec!["a", "b"]);

        assert_eq!(files.insert_all(vec!["b".into(), "c".into()]), 1);
        assert_eq!(files.paths, vec!["a", "b", "c"]);

        assert!(files.remove("b"));
        assert!(!files.remove("missing"));
        assert_eq!(files.paths, vec!["a", "c"]);
    }

    #[test]
    fn test_apply_replaces_files_and_merges_content() {
        let mut doc = metadata();
        let patch = MetadataPatch {
            files: Some(FilesBlock::new(vec!["c.x".into()])),
            content: Some(ContentPatch::problem("new problem")),
            ..Default::default()
        };
        doc.apply(&patch);

        assert_eq!(doc.files.paths, vec!["c.x"]);
        assert_eq!(doc.content.problem, "new problem");
        assert_eq!(doc.content.expected_output, "E");
        assert_eq!(doc.status, IntentStatus::Completed);
    }

    #[test]
    fn test_touch_is_monotonic() {
        let mut doc = metadata();
        let future = Utc::now() + chrono::Duration::hours(1);
        doc.updated = future;
        doc.touch();
        assert_eq!(doc.updated, future);
    }

    #[test]
    fn test_toml_round_trip() {
        let doc = metadata();
        let text = toml::to_string_pretty(&doc).unwrap();
        assert!(text.contains("status = \"completed\""));
        assert!(text.contains("stage = \"intent-generated\""));
        let parsed: IntentMetadata = toml::from_str(&text).unwrap();
        assert_eq!(parsed, doc);
    }
}
