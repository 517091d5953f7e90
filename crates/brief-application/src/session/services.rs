//! Collaborators shared by every session in one workspace.

use brief_core::config::IntentConfig;
use brief_core::error::Result;
use brief_core::fs::FileSystemProvider;
use brief_core::intent::{IntentMetadata, MetadataStore, validate_name};
use brief_core::tokens::TokenEstimator;
use brief_infrastructure::{BriefPaths, FsMetadataStore, LocalFileSystem, SnapshotGenerator};
use std::path::PathBuf;
use std::sync::Arc;

use super::lease::LeaseRegistry;

/// Dependency bundle handed to [`IntentSession`](super::IntentSession).
#[derive(Clone)]
pub struct IntentServices {
    pub provider: Arc<dyn FileSystemProvider>,
    pub store: Arc<dyn MetadataStore>,
    pub snapshots: Arc<SnapshotGenerator>,
    pub config: IntentConfig,
    pub workspace_root: PathBuf,
    pub intents_root: PathBuf,
    pub leases: LeaseRegistry,
}

impl IntentServices {
    pub fn new(
        provider: Arc<dyn FileSystemProvider>,
        store: Arc<dyn MetadataStore>,
        config: IntentConfig,
        workspace_root: impl Into<PathBuf>,
        intents_root: impl Into<PathBuf>,
    ) -> Self {
        let workspace_root = workspace_root.into();
        let snapshots = Arc::new(SnapshotGenerator::from_config(
            Arc::clone(&provider),
            workspace_root.clone(),
            &config,
        ));
        Self {
            provider,
            store,
            snapshots,
            config,
            workspace_root,
            intents_root: intents_root.into(),
            leases: LeaseRegistry::new(),
        }
    }

    /// Local-disk services with intents under `<workspace>/.brief/intents`.
    pub fn local(workspace_root: impl Into<PathBuf>, config: IntentConfig) -> Self {
        let workspace_root = workspace_root.into();
        let provider: Arc<dyn FileSystemProvider> = Arc::new(LocalFileSystem::new());
        let store = Arc::new(FsMetadataStore::new(Arc::clone(&provider)));
        let intents_root = BriefPaths::intents_root(&workspace_root);
        Self::new(provider, store, config, workspace_root, intents_root)
    }

    pub fn with_intents_root(mut self, intents_root: impl Into<PathBuf>) -> Self {
        self.intents_root = intents_root.into();
        self
    }

    /// Folder of the intent `name` under the intents root.
    ///
    /// # Errors
    ///
    /// `Validation` when `name` is not a valid intent name, so it can never
    /// point outside the root.
    pub fn folder_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.intents_root.join(name))
    }

    pub fn estimator(&self) -> TokenEstimator {
        TokenEstimator::new(self.config.token_limit)
    }

    pub fn resolve(&self, relative: &str) -> PathBuf {
        brief_core::fs::resolve(&self.workspace_root, relative)
    }

    /// Reads every intent under the intents root, sorted by folder name.
    ///
    /// Folders without a readable metadata document are skipped. A missing
    /// root yields an empty list.
    pub async fn list_intents(&self) -> Result<Vec<IntentMetadata>> {
        let entries = match self.provider.list(&self.intents_root).await {
            Ok(entries) => entries,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut intents = Vec::new();
        for entry in entries.into_iter().filter(|e| e.is_directory) {
            let folder = self.intents_root.join(&entry.name);
            match self.store.read(&folder).await {
                Some(document) => intents.push(document),
                None => {
                    tracing::debug!(folder = %folder.display(), "Skipping folder without metadata");
                }
            }
        }
        Ok(intents)
    }
}
