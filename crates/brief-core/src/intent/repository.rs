//! Metadata store trait.
//!
//! Defines the persistence contract for the per-intent metadata document.

use async_trait::async_trait;
use std::path::Path;

use super::model::{IntentMetadata, MetadataPatch, NewIntent};
use crate::error::Result;

/// Durable per-intent document persistence.
///
/// One document lives in each intent folder. There is no coordination
/// between stores pointed at the same folder: the last writer wins.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Writes a fresh document with a generated id and returns it.
    async fn create(&self, folder: &Path, intent: NewIntent) -> Result<IntentMetadata>;

    /// Loads the document.
    ///
    /// Never fails: a missing or unparsable document is logged and reported
    /// as `None`.
    async fn read(&self, folder: &Path) -> Option<IntentMetadata>;

    /// Read-modify-write with a field-scoped patch; stamps `updated`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(doc))`: the document as written
    /// - `Ok(None)`: no prior document existed (nothing is created)
    /// - `Err(_)`: the write failed
    async fn update(&self, folder: &Path, patch: MetadataPatch) -> Result<Option<IntentMetadata>>;

    /// Overwrites the whole document.
    async fn save(&self, folder: &Path, document: &IntentMetadata) -> Result<()>;

    /// Bumps the open counter. Concurrent calls may lose an increment.
    async fn increment_opens(&self, folder: &Path) -> Result<Option<IntentMetadata>>;
}
