//! TOML-backed `MetadataStore`.
//!
//! Directory structure:
//! ```text
//! <intents_root>/
//! └── fix-bug/
//!     ├── intent.md
//!     ├── codebase.md
//!     └── .metadata.toml
//! ```

use async_trait::async_trait;
use brief_core::error::Result;
use brief_core::fs::FileSystemProvider;
use brief_core::intent::{
    IntentMetadata, METADATA_DOCUMENT, METADATA_VERSION, MetadataPatch, MetadataStore, NewIntent,
    OpenStats,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Stores each intent's metadata as `.metadata.toml` inside its folder.
#[derive(Clone)]
pub struct FsMetadataStore {
    provider: Arc<dyn FileSystemProvider>,
}

impl FsMetadataStore {
    pub fn new(provider: Arc<dyn FileSystemProvider>) -> Self {
        Self { provider }
    }

    fn document_path(folder: &Path) -> PathBuf {
        folder.join(METADATA_DOCUMENT)
    }
}

#[async_trait]
impl MetadataStore for FsMetadataStore {
    async fn create(&self, folder: &Path, intent: NewIntent) -> Result<IntentMetadata> {
        let now = Utc::now();
        let document = IntentMetadata {
            version: METADATA_VERSION.to_string(),
            id: Uuid::new_v4().to_string(),
            name: intent.name,
            display_name: intent.display_name,
            status: intent.status,
            created: now,
            updated: now,
            workflow: intent.workflow,
            files: intent.files,
            content: intent.content,
            tokens: intent.tokens,
            stats: OpenStats::default(),
        };

        self.save(folder, &document).await?;
        tracing::debug!(folder = %folder.display(), id = %document.id, "Created metadata document");
        Ok(document)
    }

    async fn read(&self, folder: &Path) -> Option<IntentMetadata> {
        let path = Self::document_path(folder);
        let text = match self.provider.read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %path.display(), "No metadata document");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read metadata document");
                return None;
            }
        };

        match toml::from_str(&text) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse metadata document");
                None
            }
        }
    }

    async fn update(&self, folder: &Path, patch: MetadataPatch) -> Result<Option<IntentMetadata>> {
        let Some(mut document) = self.read(folder).await else {
            return Ok(None);
        };

        document.apply(&patch);
        document.touch();
        self.save(folder, &document).await?;
        Ok(Some(document))
    }

    async fn save(&self, folder: &Path, document: &IntentMetadata) -> Result<()> {
        let text = toml::to_string_pretty(document)?;
        self.provider
            .write_atomic(&Self::document_path(folder), text.as_bytes())
            .await
    }

    async fn increment_opens(&self, folder: &Path) -> Result<Option<IntentMetadata>> {
        let Some(mut document) = self.read(folder).await else {
            return Ok(None);
        };

        document.stats.opens += 1;
        document.stats.last_opened = Some(Utc::now());
        self.save(folder, &document).await?;
        Ok(Some(document))
    }
}
