//! External snapshot generator process.
//!
//! The process receives the path to a JSON manifest as its last argument
//! and is expected to write the snapshot document to the manifest's
//! `output` location. The only signals read back are the exit status and
//! whether the output exists afterwards.

use brief_core::error::{BriefError, Result};
use brief_core::fs::FileSystemProvider;
use brief_core::snapshot::FileDescriptor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

const STDERR_PREVIEW_CHARS: usize = 400;

/// Transient manifest handed to the external process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub workspace_root: PathBuf,
    pub output: PathBuf,
    pub files: Vec<FileDescriptor>,
}

/// Runs a configured generator command with a hard timeout.
#[derive(Debug, Clone)]
pub struct ExternalGenerator {
    runtime: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalGenerator {
    pub fn new(runtime: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            runtime: runtime.into(),
            args,
            timeout,
        }
    }

    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    /// Writes the manifest, runs the process and validates its output.
    ///
    /// Any stale document at `manifest.output` is removed first so that an
    /// old snapshot cannot pass for a fresh one. The manifest is removed
    /// afterwards whatever the outcome.
    ///
    /// # Errors
    ///
    /// `BriefError::Subprocess` on spawn failure, timeout, non-zero exit, or
    /// a missing output document.
    pub async fn run(
        &self,
        provider: &dyn FileSystemProvider,
        manifest: &SnapshotManifest,
        manifest_path: &Path,
    ) -> Result<()> {
        if provider.exists(&manifest.output).await {
            provider.delete(&manifest.output, false).await?;
        }

        let json = serde_json::to_vec_pretty(manifest)?;
        provider.write(manifest_path, &json).await?;

        let outcome = self.invoke(provider, manifest, manifest_path).await;

        if let Err(e) = provider.delete(manifest_path, false).await {
            tracing::debug!(path = %manifest_path.display(), error = %e, "Failed to remove snapshot manifest");
        }
        outcome
    }

    async fn invoke(
        &self,
        provider: &dyn FileSystemProvider,
        manifest: &SnapshotManifest,
        manifest_path: &Path,
    ) -> Result<()> {
        let mut cmd = Command::new(&self.runtime);
        cmd.args(&self.args)
            .arg(manifest_path)
            .current_dir(&manifest.workspace_root)
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        tracing::debug!(runtime = %self.runtime, manifest = %manifest_path.display(), "Starting external snapshot generator");

        let child = cmd.spawn().map_err(|e| {
            BriefError::subprocess(format!("Failed to spawn '{}': {}", self.runtime, e))
        })?;

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(BriefError::subprocess(format!(
                    "Failed to wait for '{}': {}",
                    self.runtime, e
                )));
            }
            Err(_) => {
                return Err(BriefError::subprocess(format!(
                    "'{}' timed out after {}s",
                    self.runtime,
                    self.timeout.as_secs_f64()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BriefError::subprocess(format!(
                "'{}' exited with {}: {}",
                self.runtime,
                output.status,
                preview(stderr.trim(), STDERR_PREVIEW_CHARS)
            )));
        }

        if !provider.exists(&manifest.output).await {
            return Err(BriefError::subprocess(format!(
                "'{}' exited successfully but wrote no {}",
                self.runtime,
                manifest.output.display()
            )));
        }

        Ok(())
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_fs::LocalFileSystem;
    use tempfile::TempDir;

    fn manifest(temp: &TempDir) -> (SnapshotManifest, PathBuf) {
        let folder = temp.path().join("intent");
        let manifest = SnapshotManifest {
            workspace_root: temp.path().to_path_buf(),
            output: folder.join("codebase.md"),
            files: vec![FileDescriptor::resolve(temp.path(), "a.x")],
        };
        (manifest, folder.join(".snapshot-manifest.json"))
    }

    fn sh(script: &str, secs: u64) -> ExternalGenerator {
        ExternalGenerator::new(
            "sh",
            vec!["-c".into(), script.into()],
            Duration::from_secs(secs),
        )
    }

    #[tokio::test]
    async fn test_success_requires_output_document() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFileSystem::new();
        let (manifest, manifest_path) = manifest(&temp);

        // `$0` is the manifest path; the output sits next to it.
        let writer = sh(r#"printf external > "$(dirname "$0")/codebase.md""#, 10);
        writer.run(&fs, &manifest, &manifest_path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&manifest.output).unwrap(), "external");
        assert!(!manifest_path.exists());

        let silent = sh("exit 0", 10);
        let err = silent.run(&fs, &manifest, &manifest_path).await.unwrap_err();
        assert!(err.is_subprocess());
        assert!(!manifest.output.exists());
    }

    #[tokio::test]
    async fn test_non_zero_exit_fails() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFileSystem::new();
        let (manifest, manifest_path) = manifest(&temp);

        let failing = sh("echo broken >&2; exit 3", 10);
        let err = failing.run(&fs, &manifest, &manifest_path).await.unwrap_err();
        assert!(err.is_subprocess());
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn test_timeout_fails() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFileSystem::new();
        let (manifest, manifest_path) = manifest(&temp);

        let slow = ExternalGenerator::new(
            "sh",
            vec!["-c".into(), "sleep 5".into()],
            Duration::from_millis(200),
        );
        let err = slow.run(&fs, &manifest, &manifest_path).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_missing_runtime_fails_to_spawn() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFileSystem::new();
        let (manifest, manifest_path) = manifest(&temp);

        let missing = ExternalGenerator::new("brief-no-such-runtime", vec![], Duration::from_secs(1));
        let err = missing.run(&fs, &manifest, &manifest_path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }
}
