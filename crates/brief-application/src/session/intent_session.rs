//! The intent session aggregate.
//!
//! An `IntentSession` owns the in-memory state of one intent and keeps the
//! three persisted documents (`intent.md`, `codebase.md`,
//! `.metadata.toml`) in step with it.
//!
//! # Ordering
//!
//! Mutating methods take `&mut self`, so callers must await one mutation
//! before issuing the next. `dispose` and `delete_intent` consume the
//! session; a session can only be torn down once.
//!
//! Metadata writes are sent through the auto-save actor so they are
//! serialized with debounced flushes.

use brief_core::config::ArchivePolicy;
use brief_core::error::{BriefError, Result};
use brief_core::event::{EventHub, IntentEvent};
use brief_core::intent::{
    ContentPatch, FilesBlock, INTENT_DOCUMENT, IntentContent, IntentFormData, IntentMetadata,
    IntentStatus, MetadataPatch, NewIntent, SNAPSHOT_DOCUMENT, Workflow, WorkflowStage,
    check_pair, display_name,
};
use brief_core::snapshot::FileDescriptor;
use brief_core::tokens::TokenStats;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::lease::FolderLease;
use super::services::IntentServices;
use crate::autosave::{AutoSaveQueue, AutoSaveTarget, FlushOutcome};

/// Aggregate root for one intent.
pub struct IntentSession {
    services: IntentServices,
    folder: PathBuf,
    name: Option<String>,
    display_name: String,
    status: IntentStatus,
    workflow: Workflow,
    files: FilesBlock,
    content: IntentContent,
    tokens: TokenStats,
    /// Whether a metadata document exists for this session
    persisted: bool,
    warnings: Vec<String>,
    auto_save: AutoSaveQueue,
    events: EventHub,
    _lease: FolderLease,
}

impl IntentSession {
    /// Starts a new, unsaved intent in `folder` with `files` selected.
    ///
    /// Nothing is written until the first successful
    /// [`generate_intent`](Self::generate_intent).
    ///
    /// # Errors
    ///
    /// `Conflict` when another session holds `folder`.
    pub async fn create(
        services: IntentServices,
        folder: impl Into<PathBuf>,
        files: Vec<String>,
    ) -> Result<Self> {
        let folder = folder.into();
        let lease = services.leases.acquire(&folder)?;

        let mut files = FilesBlock::new(files);
        files.total_size = Self::total_size_of(&services, &files.paths).await;
        let content = IntentContent::default();
        let tokens = Self::estimate(&services, &content, &files.paths).await;

        let session = Self::assemble(
            services,
            folder,
            lease,
            None,
            String::new(),
            IntentStatus::Draft,
            Workflow::default(),
            files,
            content,
            tokens,
            false,
        );

        tracing::info!(folder = %session.folder.display(), files = session.files.len(), "Created intent session");
        Ok(session)
    }

    /// Opens the persisted intent `name` and bumps its open counter.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no readable metadata document exists
    /// - `Conflict` when another session holds the folder
    /// - `Validation` when `name` is not a valid intent name
    pub async fn for_intent(services: IntentServices, name: &str) -> Result<Self> {
        let folder = services.folder_for(name)?;
        if services.store.read(&folder).await.is_none() {
            return Err(BriefError::not_found("Intent", name));
        }
        let lease = services.leases.acquire(&folder)?;

        let document = match services.store.increment_opens(&folder).await? {
            Some(document) => document,
            None => return Err(BriefError::not_found("Intent", name)),
        };

        let session = Self::from_document(services, folder, lease, document);
        tracing::info!(name = %name, "Opened intent session");
        Ok(session)
    }

    fn from_document(
        services: IntentServices,
        folder: PathBuf,
        lease: FolderLease,
        document: IntentMetadata,
    ) -> Self {
        let name = (!document.name.is_empty()).then_some(document.name);
        Self::assemble(
            services,
            folder,
            lease,
            name,
            document.display_name,
            document.status,
            document.workflow,
            document.files,
            document.content,
            document.tokens,
            true,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        services: IntentServices,
        folder: PathBuf,
        lease: FolderLease,
        name: Option<String>,
        display_name: String,
        status: IntentStatus,
        workflow: Workflow,
        files: FilesBlock,
        content: IntentContent,
        tokens: TokenStats,
        persisted: bool,
    ) -> Self {
        let auto_save = AutoSaveQueue::spawn(
            AutoSaveTarget {
                store: Arc::clone(&services.store),
                snapshots: Arc::clone(&services.snapshots),
                folder: folder.clone(),
                snapshot_options: services.config.snapshot,
            },
            services.config.debounce(),
            services.config.auto_save_max_retries,
        );
        let events = EventHub::new(files.paths.clone(), tokens, status, workflow);

        Self {
            services,
            folder,
            name,
            display_name,
            status,
            workflow,
            files,
            content,
            tokens,
            persisted,
            warnings: Vec::new(),
            auto_save,
            events,
            _lease: lease,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn status(&self) -> IntentStatus {
        self.status
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn files(&self) -> &[String] {
        &self.files.paths
    }

    pub fn total_size(&self) -> u64 {
        self.files.total_size
    }

    pub fn content(&self) -> &IntentContent {
        &self.content
    }

    pub fn tokens(&self) -> TokenStats {
        self.tokens
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Non-blocking warnings collected so far (external generator fallbacks).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Number of auto-save batches persisted by this session.
    pub fn auto_save_flushes(&self) -> usize {
        self.auto_save.flush_count()
    }

    pub fn intent_document_path(&self) -> PathBuf {
        self.folder.join(INTENT_DOCUMENT)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.folder.join(SNAPSHOT_DOCUMENT)
    }

    // ============================================================================
    // File set
    // ============================================================================

    /// Adds `paths` to the file set. Returns how many were new.
    ///
    /// Already-present paths are ignored; adding only duplicates changes
    /// nothing and writes nothing.
    pub async fn add_files(&mut self, paths: Vec<String>) -> Result<usize> {
        let mut files = self.files.clone();
        let added = files.insert_all(paths);
        if added == 0 {
            return Ok(0);
        }

        self.apply_files(files).await?;
        tracing::debug!(added, total = self.files.len(), "Added files");
        Ok(added)
    }

    /// Removes `path` from the file set. Returns whether it was present.
    pub async fn remove_file(&mut self, path: &str) -> Result<bool> {
        let mut files = self.files.clone();
        if !files.remove(path) {
            return Ok(false);
        }

        self.apply_files(files).await?;
        tracing::debug!(path = %path, total = self.files.len(), "Removed file");
        Ok(true)
    }

    async fn apply_files(&mut self, mut files: FilesBlock) -> Result<()> {
        files.total_size = Self::total_size_of(&self.services, &files.paths).await;
        let tokens = Self::estimate(&self.services, &self.content, &files.paths).await;

        if self.persisted {
            self.write_metadata(MetadataPatch::files(files.clone()).with_tokens(tokens))
                .await?;
            self.regenerate_snapshot(&files.paths).await?;
        }

        self.files = files;
        self.tokens = tokens;
        self.publish_files();
        self.events.publish(IntentEvent::TokensChanged(self.tokens));
        Ok(())
    }

    // ============================================================================
    // Generation
    // ============================================================================

    /// Names the intent, writes its documents and marks it completed.
    ///
    /// The first call creates the metadata document. Later calls must keep
    /// the same name, and the name must match the session folder.
    ///
    /// # Errors
    ///
    /// `Validation` for a bad form, a renamed intent or a name that differs
    /// from the folder; nothing is changed.
    pub async fn generate_intent(&mut self, form: IntentFormData) -> Result<()> {
        form.validate()?;
        self.check_name(&form.name)?;
        self.check_folder(&form.name)?;
        self.auto_save.discard();

        let content = form.content();
        let display_name = display_name(&form.name);
        let tokens = Self::estimate(&self.services, &content, &self.files.paths).await;

        self.services
            .provider
            .write_atomic(&self.intent_document_path(), form.render_document().as_bytes())
            .await?;
        self.rebuild_snapshot().await?;

        let mut workflow = self.workflow;
        if workflow.stage < WorkflowStage::IntentGenerated {
            workflow.advance(WorkflowStage::IntentGenerated)?;
        }
        let status = IntentStatus::Completed;

        let patch = MetadataPatch {
            name: Some(form.name.clone()),
            display_name: Some(display_name.clone()),
            status: Some(status),
            workflow: Some(workflow),
            files: Some(self.files.clone()),
            content: Some(ContentPatch::full(&content)),
            tokens: Some(tokens),
            stats: None,
        };
        let updated = if self.persisted {
            self.write_metadata(patch).await?
        } else {
            None
        };
        if updated.is_none() {
            self.services
                .store
                .create(
                    &self.folder,
                    NewIntent {
                        name: form.name.clone(),
                        display_name: display_name.clone(),
                        status,
                        workflow,
                        files: self.files.clone(),
                        content: content.clone(),
                        tokens,
                    },
                )
                .await?;
        }

        let workflow_changed = workflow != self.workflow;
        self.name = Some(form.name);
        self.display_name = display_name;
        self.content = content;
        self.tokens = tokens;
        self.persisted = true;
        self.workflow = workflow;
        self.status = status;

        self.events.publish(IntentEvent::TokensChanged(tokens));
        if workflow_changed {
            self.events.publish(IntentEvent::WorkflowChanged(workflow));
        }
        self.events.publish(IntentEvent::StateChanged(status));
        tracing::info!(folder = %self.folder.display(), "Generated intent");
        Ok(())
    }

    /// Refreshes the content and snapshot of a generated intent.
    ///
    /// `status` and `workflow` are left alone so an edit cannot undo
    /// progress.
    ///
    /// # Errors
    ///
    /// - `Validation` for a bad form or a renamed intent
    /// - `NotFound` when the intent has never been generated
    pub async fn regenerate_intent(&mut self, form: IntentFormData) -> Result<()> {
        form.validate()?;
        if !self.persisted {
            return Err(BriefError::not_found(
                "Intent",
                self.folder.display().to_string(),
            ));
        }
        self.check_name(&form.name)?;
        self.auto_save.discard();

        let content = form.content();
        let tokens = Self::estimate(&self.services, &content, &self.files.paths).await;

        self.services
            .provider
            .write_atomic(&self.intent_document_path(), form.render_document().as_bytes())
            .await?;
        self.rebuild_snapshot().await?;

        let patch = MetadataPatch::content(ContentPatch::full(&content)).with_tokens(tokens);
        if self.write_metadata(patch).await?.is_none() {
            return Err(BriefError::not_found(
                "Intent",
                self.folder.display().to_string(),
            ));
        }

        self.content = content;
        self.tokens = tokens;
        self.events.publish(IntentEvent::TokensChanged(tokens));
        tracing::info!(folder = %self.folder.display(), "Regenerated intent");
        Ok(())
    }

    fn check_name(&self, requested: &str) -> Result<()> {
        match &self.name {
            Some(current) if current != requested => Err(BriefError::validation(format!(
                "Intent name '{}' cannot be changed to '{}'",
                current, requested
            ))),
            _ => Ok(()),
        }
    }

    fn check_folder(&self, requested: &str) -> Result<()> {
        let folder_name = self.folder.file_name().and_then(|n| n.to_str());
        if folder_name == Some(requested) {
            return Ok(());
        }
        Err(BriefError::validation(format!(
            "Intent '{}' must live in a folder named '{}', not {}",
            requested,
            requested,
            self.folder.display()
        )))
    }

    // ============================================================================
    // Auto-save
    // ============================================================================

    /// Applies `patch` to the in-memory content now and schedules a
    /// debounced write.
    pub fn queue_auto_save(&mut self, patch: ContentPatch) {
        patch.apply_to(&mut self.content);
        self.auto_save.enqueue(patch);
    }

    /// Writes pending auto-save edits immediately.
    pub async fn flush_auto_save(&self) -> Result<FlushOutcome> {
        self.auto_save.flush().await
    }

    // ============================================================================
    // Status and workflow
    // ============================================================================

    /// Sets the user-facing status.
    ///
    /// Archiving under `ArchivePolicy::PurgeDocuments` also deletes the
    /// content and snapshot documents.
    ///
    /// # Errors
    ///
    /// `Validation` when `status` is not permitted at the current stage.
    pub async fn change_status(&mut self, status: IntentStatus) -> Result<()> {
        check_pair(status, self.workflow.stage)?;
        if status == self.status {
            return Ok(());
        }

        if self.persisted {
            self.write_metadata(MetadataPatch::status(status)).await?;
        }
        if status == IntentStatus::Archived
            && self.services.config.archive_policy == ArchivePolicy::PurgeDocuments
        {
            self.purge_documents().await;
        }

        self.status = status;
        self.events.publish(IntentEvent::StateChanged(status));
        tracing::info!(folder = %self.folder.display(), status = %status, "Changed intent status");
        Ok(())
    }

    /// Moves the workflow forward to `stage`.
    ///
    /// # Errors
    ///
    /// `Validation` for a backward move or a stage the current status does
    /// not permit.
    pub async fn update_workflow(&mut self, stage: WorkflowStage) -> Result<()> {
        let mut workflow = self.workflow;
        workflow.advance(stage)?;
        check_pair(self.status, workflow.stage)?;
        if workflow == self.workflow {
            return Ok(());
        }

        if self.persisted {
            self.write_metadata(MetadataPatch::workflow(workflow)).await?;
        }

        self.workflow = workflow;
        self.events.publish(IntentEvent::WorkflowChanged(workflow));
        tracing::info!(folder = %self.folder.display(), stage = %stage, "Advanced workflow");
        Ok(())
    }

    async fn purge_documents(&self) {
        for path in [self.intent_document_path(), self.snapshot_path()] {
            match self.services.provider.delete(&path, false).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Purged archived document"),
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to purge archived document");
                }
            }
        }
    }

    // ============================================================================
    // Teardown
    // ============================================================================

    /// Stops auto-save, then deletes the intent folder and everything in it.
    ///
    /// Irreversible.
    pub async fn delete_intent(self) -> Result<()> {
        let Self {
            services,
            folder,
            auto_save,
            events,
            _lease,
            ..
        } = self;
        auto_save.dispose().await;

        match services.provider.delete(&folder, true).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        tracing::info!(folder = %folder.display(), "Deleted intent");
        drop(events);
        drop(_lease);
        Ok(())
    }

    /// Stops auto-save, closes event channels and releases the folder.
    ///
    /// Edits still waiting for the debounce window are dropped; call
    /// [`flush_auto_save`](Self::flush_auto_save) first to keep them.
    pub async fn dispose(self) {
        let Self {
            auto_save,
            events,
            _lease,
            ..
        } = self;
        auto_save.dispose().await;
        drop(events);
        drop(_lease);
    }

    // ============================================================================
    // Helpers
    // ============================================================================

    async fn write_metadata(&self, patch: MetadataPatch) -> Result<Option<IntentMetadata>> {
        self.auto_save.update(patch).await
    }

    /// Rebuilds `codebase.md` from the current file set.
    pub async fn rebuild_snapshot(&mut self) -> Result<()> {
        let paths = self.files.paths.clone();
        self.regenerate_snapshot(&paths).await
    }

    async fn regenerate_snapshot(&mut self, paths: &[String]) -> Result<()> {
        let files: Vec<FileDescriptor> = paths
            .iter()
            .map(|p| FileDescriptor::resolve(&self.services.workspace_root, p))
            .collect();
        let report = self
            .services
            .snapshots
            .generate(&files, &self.snapshot_path(), &self.services.config.snapshot)
            .await?;
        self.warnings.extend(report.warnings);
        Ok(())
    }

    async fn total_size_of(services: &IntentServices, paths: &[String]) -> u64 {
        let mut total = 0;
        for path in paths {
            let absolute = services.resolve(path);
            match services.provider.stat(&absolute).await {
                Ok(stat) => total += stat.size,
                Err(e) => {
                    tracing::warn!(path = %absolute.display(), error = %e, "Skipping file in size total");
                }
            }
        }
        total
    }

    async fn estimate(
        services: &IntentServices,
        content: &IntentContent,
        paths: &[String],
    ) -> TokenStats {
        let absolute: Vec<PathBuf> = paths.iter().map(|p| services.resolve(p)).collect();
        services
            .estimator()
            .estimate(services.provider.as_ref(), &content.texts(), &absolute)
            .await
    }

    fn publish_files(&self) {
        self.events
            .publish(IntentEvent::FilesChanged(self.files.paths.clone()));
    }
}

#[cfg(test)]
#[path = "intent_session_test.rs"]
mod tests;
