//! Debounced auto-save of intent content.
//!
//! `AutoSaveQueue` is a handle to a small actor task that owns the pending
//! batch. Edits are sent as messages; the actor coalesces them (later edits
//! win per field), waits for a quiet period, then persists the batch in one
//! step. Edits that arrive while a flush is running queue up behind it and
//! form the next batch.
//!
//! Every other metadata write of the owning session goes through the same
//! actor via [`AutoSaveQueue::update`], so a flush and a session write never
//! overlap their read-modify-write cycles.

use brief_core::error::{BriefError, Result};
use brief_core::fs::FileSystemProvider;
use brief_core::intent::{
    ContentPatch, INTENT_DOCUMENT, IntentMetadata, MetadataPatch, MetadataStore,
    SNAPSHOT_DOCUMENT, render_intent_document,
};
use brief_core::snapshot::{FileDescriptor, SnapshotOptions};
use brief_infrastructure::SnapshotGenerator;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// Result of one flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending; nothing was written
    Idle,
    /// The batch was persisted
    Saved,
    /// No metadata document exists yet; the batch was dropped
    NoDocument,
}

/// Where a flushed batch is persisted.
#[derive(Clone)]
pub struct AutoSaveTarget {
    pub store: Arc<dyn MetadataStore>,
    pub snapshots: Arc<SnapshotGenerator>,
    pub folder: PathBuf,
    pub snapshot_options: SnapshotOptions,
}

impl AutoSaveTarget {
    fn provider(&self) -> &Arc<dyn FileSystemProvider> {
        self.snapshots.provider()
    }

    /// Merges `batch` into the persisted content.
    ///
    /// The content document is re-rendered for named intents, and the
    /// snapshot is regenerated when the intent has files. Failures in those
    /// follow-up steps are logged; only the metadata write decides the
    /// outcome.
    async fn persist(&self, batch: &ContentPatch) -> Result<Option<IntentMetadata>> {
        let Some(document) = self
            .store
            .update(&self.folder, MetadataPatch::content(batch.clone()))
            .await?
        else {
            return Ok(None);
        };

        if !document.name.is_empty() {
            let body = render_intent_document(&document.display_name, &document.content);
            let path = self.folder.join(INTENT_DOCUMENT);
            if let Err(e) = self.provider().write_atomic(&path, body.as_bytes()).await {
                tracing::warn!(path = %path.display(), error = %e, "Auto-save could not refresh intent document");
            }
        }

        if !document.files.is_empty() {
            let workspace_root = self.snapshots.workspace_root();
            let files: Vec<FileDescriptor> = document
                .files
                .paths
                .iter()
                .map(|p| FileDescriptor::resolve(workspace_root, p))
                .collect();
            let output = self.folder.join(SNAPSHOT_DOCUMENT);
            match self
                .snapshots
                .generate(&files, &output, &self.snapshot_options)
                .await
            {
                Ok(report) => {
                    for warning in report.warnings {
                        tracing::warn!(%warning, "Auto-save snapshot warning");
                    }
                }
                Err(e) => {
                    tracing::warn!(folder = %self.folder.display(), error = %e, "Auto-save could not regenerate snapshot");
                }
            }
        }

        Ok(Some(document))
    }
}

enum Command {
    Enqueue(ContentPatch),
    Discard,
    Flush(oneshot::Sender<Result<FlushOutcome>>),
    Update(MetadataPatch, oneshot::Sender<Result<Option<IntentMetadata>>>),
    Shutdown,
}

/// Handle to the auto-save actor.
///
/// Dropping the handle (or calling [`dispose`](Self::dispose)) stops the
/// actor; unflushed edits are dropped.
pub struct AutoSaveQueue {
    tx: mpsc::UnboundedSender<Command>,
    flushes: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl AutoSaveQueue {
    /// Spawns the actor on the current tokio runtime.
    pub fn spawn(target: AutoSaveTarget, debounce: Duration, max_retries: u32) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let flushes = Arc::new(AtomicUsize::new(0));
        let actor = AutoSaveActor {
            rx,
            target,
            debounce,
            max_retries,
            pending: ContentPatch::default(),
            deadline: None,
            attempts: 0,
            flushes: Arc::clone(&flushes),
        };
        let task = tokio::spawn(actor.run());
        Self { tx, flushes, task }
    }

    /// Adds edits to the pending batch and restarts the debounce window.
    pub fn enqueue(&self, patch: ContentPatch) {
        if patch.is_empty() {
            return;
        }
        if self.tx.send(Command::Enqueue(patch)).is_err() {
            tracing::debug!("Auto-save actor stopped, edit not queued");
        }
    }

    /// Drops the pending batch without writing it.
    pub fn discard(&self) {
        let _ = self.tx.send(Command::Discard);
    }

    /// Persists the pending batch now, bypassing the debounce window.
    ///
    /// On failure the batch stays pending and is retried on the next window.
    pub async fn flush(&self) -> Result<FlushOutcome> {
        let (reply, response) = oneshot::channel();
        if self.tx.send(Command::Flush(reply)).is_err() {
            return Ok(FlushOutcome::Idle);
        }
        response.await.unwrap_or(Ok(FlushOutcome::Idle))
    }

    /// Applies `patch` to the metadata document, ordered after any flush
    /// already running. The pending batch stays pending.
    pub async fn update(&self, patch: MetadataPatch) -> Result<Option<IntentMetadata>> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Command::Update(patch, reply))
            .map_err(|_| BriefError::internal("Auto-save actor stopped"))?;
        response
            .await
            .map_err(|_| BriefError::internal("Auto-save actor stopped"))?
    }

    /// Number of batches persisted so far.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Stops the actor and waits for it to exit. Pending edits are dropped.
    pub async fn dispose(self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Auto-save actor ended abnormally");
        }
    }
}

struct AutoSaveActor {
    rx: mpsc::UnboundedReceiver<Command>,
    target: AutoSaveTarget,
    debounce: Duration,
    max_retries: u32,
    pending: ContentPatch,
    deadline: Option<Instant>,
    attempts: u32,
    flushes: Arc<AtomicUsize>,
}

impl AutoSaveActor {
    async fn run(mut self) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(Command::Enqueue(patch)) => {
                        self.pending.merge(patch);
                        self.deadline = Some(Instant::now() + self.debounce);
                    }
                    Some(Command::Discard) => {
                        self.pending = ContentPatch::default();
                        self.deadline = None;
                        self.attempts = 0;
                    }
                    Some(Command::Flush(reply)) => {
                        self.deadline = None;
                        let outcome = self.flush().await;
                        let _ = reply.send(outcome);
                    }
                    Some(Command::Update(patch, reply)) => {
                        let result = self.target.store.update(&self.target.folder, patch).await;
                        let _ = reply.send(result);
                    }
                    Some(Command::Shutdown) | None => {
                        if !self.pending.is_empty() {
                            tracing::debug!(
                                fields = ?self.pending.field_names(),
                                "Auto-save stopped with unflushed edits"
                            );
                        }
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    if let Err(e) = self.flush().await {
                        tracing::warn!(folder = %self.target.folder.display(), error = %e, "Auto-save flush failed");
                    }
                }
            }
        }
    }

    async fn flush(&mut self) -> Result<FlushOutcome> {
        if self.pending.is_empty() {
            return Ok(FlushOutcome::Idle);
        }

        let batch = std::mem::take(&mut self.pending);
        match self.target.persist(&batch).await {
            Ok(Some(_)) => {
                self.attempts = 0;
                self.flushes.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(fields = ?batch.field_names(), "Auto-save flushed");
                Ok(FlushOutcome::Saved)
            }
            Ok(None) => {
                self.attempts = 0;
                tracing::debug!(folder = %self.target.folder.display(), "No metadata document yet, auto-save batch dropped");
                Ok(FlushOutcome::NoDocument)
            }
            Err(e) => {
                self.restore(batch);
                Err(e)
            }
        }
    }

    /// Puts a failed batch back under any newer edits and re-arms the timer.
    fn restore(&mut self, mut batch: ContentPatch) {
        self.attempts += 1;
        if self.attempts > self.max_retries {
            tracing::warn!(
                attempts = self.attempts,
                fields = ?batch.field_names(),
                "Auto-save giving up, batch dropped"
            );
            self.attempts = 0;
            return;
        }

        batch.merge(std::mem::take(&mut self.pending));
        self.pending = batch;
        self.deadline = Some(Instant::now() + self.debounce);
    }
}
