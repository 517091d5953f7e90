//! In-process leases on intent folders.

use brief_core::error::{BriefError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Hands out at most one live [`FolderLease`] per intent folder.
#[derive(Debug, Clone, Default)]
pub struct LeaseRegistry {
    held: Arc<Mutex<HashSet<PathBuf>>>,
}

impl LeaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lease on `folder`.
    ///
    /// # Errors
    ///
    /// `BriefError::Conflict` when another session already holds it.
    pub fn acquire(&self, folder: &Path) -> Result<FolderLease> {
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        if !held.insert(folder.to_path_buf()) {
            return Err(BriefError::Conflict(format!(
                "Intent folder {} is already open in another session",
                folder.display()
            )));
        }
        tracing::debug!(folder = %folder.display(), "Lease acquired");
        Ok(FolderLease {
            folder: folder.to_path_buf(),
            held: Arc::clone(&self.held),
        })
    }

    pub fn is_held(&self, folder: &Path) -> bool {
        let held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        held.contains(folder)
    }
}

/// Exclusive claim on one folder; released on drop.
#[derive(Debug)]
pub struct FolderLease {
    folder: PathBuf,
    held: Arc<Mutex<HashSet<PathBuf>>>,
}

impl FolderLease {
    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl Drop for FolderLease {
    fn drop(&mut self) {
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        held.remove(&self.folder);
        tracing::debug!(folder = %self.folder.display(), "Lease released");
    }
}
