//! Local disk implementation of `FileSystemProvider`.
//!
//! Atomic writes go through a sibling temp file that is fsynced and then
//! renamed over the target, so a reader sees either the old document or the
//! new one, never a torn write.

use async_trait::async_trait;
use brief_core::error::{BriefError, Result};
use brief_core::fs::{DirEntry, FileStat, FileSystemProvider};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// `FileSystemProvider` backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| BriefError::from_io_at(e, parent))?;
            }
        }
        Ok(())
    }

    /// Temp path next to `path`: `dir/.name.tmp`.
    fn temp_path(path: &Path) -> Result<PathBuf> {
        let parent = path
            .parent()
            .ok_or_else(|| BriefError::io(format!("{} has no parent directory", path.display())))?;
        let file_name = path
            .file_name()
            .ok_or_else(|| BriefError::io(format!("{} has no file name", path.display())))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

#[async_trait]
impl FileSystemProvider for LocalFileSystem {
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path)
            .await
            .map_err(|e| BriefError::from_io_at(e, path))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        Self::ensure_parent(path).await?;
        fs::write(path, data)
            .await
            .map_err(|e| BriefError::from_io_at(e, path))
    }

    async fn stat(&self, path: &Path) -> Result<FileStat> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| BriefError::from_io_at(e, path))?;
        Ok(FileStat {
            size: metadata.len(),
            is_directory: metadata.is_dir(),
        })
    }

    async fn delete(&self, path: &Path, recursive: bool) -> Result<()> {
        let stat = self.stat(path).await?;
        let result = match (stat.is_directory, recursive) {
            (true, true) => fs::remove_dir_all(path).await,
            (true, false) => fs::remove_dir(path).await,
            (false, _) => fs::remove_file(path).await,
        };
        result.map_err(|e| BriefError::from_io_at(e, path))
    }

    async fn list(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let mut reader = fs::read_dir(dir)
            .await
            .map_err(|e| BriefError::from_io_at(e, dir))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| BriefError::from_io_at(e, dir))?
        {
            let is_directory = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        Self::ensure_parent(path).await?;
        let tmp_path = Self::temp_path(path)?;

        let mut tmp_file = fs::File::create(&tmp_path)
            .await
            .map_err(|e| BriefError::from_io_at(e, &tmp_path))?;
        tmp_file.write_all(data).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        if let Err(e) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BriefError::from_io_at(e, path));
        }
        Ok(())
    }
}
