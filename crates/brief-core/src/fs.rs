//! File system provider abstraction.
//!
//! The intent lifecycle only needs five storage primitives. Everything that
//! touches disk (metadata documents, snapshots, token estimation) goes
//! through this trait so the storage medium can be swapped out.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Size information returned by [`FileSystemProvider::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes
    pub size: u64,
    /// Whether the entry is a directory
    pub is_directory: bool,
}

/// One entry returned by [`FileSystemProvider::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Storage primitives consumed by the intent core.
///
/// Missing paths must be reported as `BriefError::NotFound` so callers can
/// tell absence apart from other I/O failures.
#[async_trait]
pub trait FileSystemProvider: Send + Sync {
    /// Reads the whole file.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Writes the whole file, creating parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Returns size information for a path.
    async fn stat(&self, path: &Path) -> Result<FileStat>;

    /// Deletes a file, or a directory when `recursive` is set.
    async fn delete(&self, path: &Path, recursive: bool) -> Result<()>;

    /// Lists the direct children of a directory.
    async fn list(&self, dir: &Path) -> Result<Vec<DirEntry>>;

    /// Writes the file so readers never observe a partial document.
    ///
    /// Providers without an atomic primitive fall back to [`write`](Self::write).
    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.write(path, data).await
    }

    /// Reads a file as text, replacing invalid UTF-8 sequences.
    async fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Returns true when `stat` succeeds.
    async fn exists(&self, path: &Path) -> bool {
        self.stat(path).await.is_ok()
    }
}

/// Resolves a workspace-relative path against the workspace root.
///
/// Absolute paths are returned unchanged.
pub fn resolve(workspace_root: &Path, relative: &str) -> PathBuf {
    let candidate = Path::new(relative);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        workspace_root.join(candidate)
    }
}
