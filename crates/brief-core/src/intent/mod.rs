//! Intent domain module.
//!
//! # Module Structure
//!
//! - `state`: `IntentStatus`, `WorkflowStage` and their validity table
//! - `content`: `IntentContent` and field-scoped `ContentPatch`
//! - `name`: slug rules and display names
//! - `form`: `IntentFormData` and the rendered content document
//! - `model`: the persisted `IntentMetadata` document
//! - `repository`: `MetadataStore` trait

mod content;
mod form;
mod model;
mod name;
mod repository;
mod state;

pub use content::{ContentPatch, IntentContent};
pub use form::{IntentFormData, render_intent_document};
pub use model::{
    FilesBlock, IntentMetadata, METADATA_VERSION, MetadataPatch, NewIntent, OpenStats,
};
pub use name::{MAX_NAME_LEN, display_name, validate_name};
pub use repository::MetadataStore;
pub use state::{IntentStatus, Workflow, WorkflowStage, check_pair};

/// Primary content document inside an intent folder.
pub const INTENT_DOCUMENT: &str = "intent.md";
/// Generated snapshot document inside an intent folder.
pub const SNAPSHOT_DOCUMENT: &str = "codebase.md";
/// Metadata document inside an intent folder.
pub const METADATA_DOCUMENT: &str = ".metadata.toml";
/// Transient manifest written during an external-generator run.
pub const SNAPSHOT_MANIFEST: &str = ".snapshot-manifest.json";
