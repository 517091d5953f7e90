//! Snapshot document model and rendering.
//!
//! Rendering here is pure: it turns already-loaded entries into the
//! markdown document. Reading the files and the external-process strategy
//! live in the infrastructure layer.

mod model;
mod render;

pub use model::{FileCategory, FileDescriptor, SnapshotFormat, SnapshotOptions, language_for};
pub use render::{EntryBody, SNAPSHOT_TITLE, SnapshotEntry, human_size, render_markdown};
