//! Snapshot generation with an optional external-process strategy.

use brief_core::config::IntentConfig;
use brief_core::error::{BriefError, Result};
use brief_core::fs::FileSystemProvider;
use brief_core::intent::SNAPSHOT_MANIFEST;
use brief_core::snapshot::{
    EntryBody, FileDescriptor, SnapshotEntry, SnapshotFormat, SnapshotOptions, render_markdown,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::external_generator::{ExternalGenerator, SnapshotManifest};

/// Which path produced the snapshot document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStrategy {
    Builtin,
    External,
}

/// Outcome of one `generate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotReport {
    pub output_path: PathBuf,
    pub strategy: SnapshotStrategy,
    pub file_count: usize,
    /// Non-blocking problems, such as an external generator fallback
    pub warnings: Vec<String>,
}

/// Builds the snapshot document for a list of files.
///
/// With an external generator configured, the process is tried first; any
/// failure falls back to the built-in renderer and is reported as a warning
/// rather than an error.
pub struct SnapshotGenerator {
    provider: Arc<dyn FileSystemProvider>,
    workspace_root: PathBuf,
    external: Option<ExternalGenerator>,
}

impl SnapshotGenerator {
    pub fn new(provider: Arc<dyn FileSystemProvider>, workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            workspace_root: workspace_root.into(),
            external: None,
        }
    }

    pub fn with_external(mut self, external: ExternalGenerator) -> Self {
        self.external = Some(external);
        self
    }

    /// Creates a generator honouring `use_external_generator` and its settings.
    pub fn from_config(
        provider: Arc<dyn FileSystemProvider>,
        workspace_root: impl Into<PathBuf>,
        config: &IntentConfig,
    ) -> Self {
        let generator = Self::new(provider, workspace_root);
        if config.use_external_generator {
            generator.with_external(ExternalGenerator::new(
                config.external_runtime_path.clone(),
                config.external_args.clone(),
                config.external_timeout(),
            ))
        } else {
            generator
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn provider(&self) -> &Arc<dyn FileSystemProvider> {
        &self.provider
    }

    /// Writes the snapshot for `files` to `output`.
    ///
    /// Sections follow the order of `files`. Unreadable files become
    /// placeholder sections; they never abort the document.
    ///
    /// # Errors
    ///
    /// - `Unsupported` for `SnapshotFormat::Archive`
    /// - whatever the provider reports when the document itself cannot be written
    pub async fn generate(
        &self,
        files: &[FileDescriptor],
        output: &Path,
        options: &SnapshotOptions,
    ) -> Result<SnapshotReport> {
        if options.format == SnapshotFormat::Archive {
            return Err(BriefError::Unsupported(
                "Archive snapshot format is not implemented".to_string(),
            ));
        }

        let mut warnings = Vec::new();

        if let Some(external) = &self.external {
            match self.run_external(external, files, output).await {
                Ok(()) => {
                    tracing::info!(output = %output.display(), files = files.len(), "Snapshot written by external generator");
                    return Ok(SnapshotReport {
                        output_path: output.to_path_buf(),
                        strategy: SnapshotStrategy::External,
                        file_count: files.len(),
                        warnings,
                    });
                }
                Err(e) => {
                    tracing::warn!(runtime = %external.runtime(), error = %e, "External snapshot generator failed, using built-in generator");
                    warnings.push(format!(
                        "External generator failed, used built-in generator: {}",
                        e
                    ));
                }
            }
        }

        self.generate_builtin(files, output, options).await?;
        tracing::debug!(output = %output.display(), files = files.len(), "Snapshot written");

        Ok(SnapshotReport {
            output_path: output.to_path_buf(),
            strategy: SnapshotStrategy::Builtin,
            file_count: files.len(),
            warnings,
        })
    }

    async fn run_external(
        &self,
        external: &ExternalGenerator,
        files: &[FileDescriptor],
        output: &Path,
    ) -> Result<()> {
        let manifest_path = output
            .parent()
            .map(|dir| dir.join(SNAPSHOT_MANIFEST))
            .ok_or_else(|| BriefError::io(format!("{} has no parent directory", output.display())))?;

        let manifest = SnapshotManifest {
            workspace_root: self.workspace_root.clone(),
            output: output.to_path_buf(),
            files: files.to_vec(),
        };
        external
            .run(self.provider.as_ref(), &manifest, &manifest_path)
            .await
    }

    async fn generate_builtin(
        &self,
        files: &[FileDescriptor],
        output: &Path,
        options: &SnapshotOptions,
    ) -> Result<()> {
        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            let body = match self.provider.read(&file.absolute_path).await {
                Ok(bytes) => EntryBody::Text {
                    size: bytes.len() as u64,
                    content: String::from_utf8_lossy(&bytes).into_owned(),
                },
                Err(e) => {
                    tracing::warn!(path = %file.absolute_path.display(), error = %e, "Unreadable file in snapshot");
                    EntryBody::Unreadable {
                        reason: e.to_string(),
                    }
                }
            };
            entries.push(SnapshotEntry {
                relative_path: file.relative_path.clone(),
                body,
            });
        }

        let document = render_markdown(&entries, options, Utc::now());
        self.provider.write_atomic(output, document.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_fs::LocalFileSystem;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        files: Vec<FileDescriptor>,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            std::fs::write(temp.path().join("b.x"), "b".repeat(800)).unwrap();
            std::fs::write(temp.path().join("a.x"), "a".repeat(400)).unwrap();
            let files = vec![
                FileDescriptor::resolve(temp.path(), "a.x"),
                FileDescriptor::resolve(temp.path(), "b.x"),
            ];
            Self { temp, files }
        }

        fn output(&self) -> PathBuf {
            self.temp.path().join("intent/codebase.md")
        }

        fn generator(&self) -> SnapshotGenerator {
            SnapshotGenerator::new(Arc::new(LocalFileSystem::new()), self.temp.path())
        }
    }

    fn without_timestamp(doc: &str) -> String {
        doc.lines()
            .filter(|l| !l.starts_with("Generated: "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_builtin_sections_follow_input_order() {
        let fixture = Fixture::new();
        let report = fixture
            .generator()
            .generate(&fixture.files, &fixture.output(), &SnapshotOptions::default())
            .await
            .unwrap();

        assert_eq!(report.strategy, SnapshotStrategy::Builtin);
        assert_eq!(report.file_count, 2);
        assert!(report.warnings.is_empty());

        let doc = std::fs::read_to_string(fixture.output()).unwrap();
        assert!(doc.find("### a.x").unwrap() < doc.find("### b.x").unwrap());
    }

    #[tokio::test]
    async fn test_regeneration_is_deterministic() {
        let fixture = Fixture::new();
        let generator = fixture.generator();
        let options = SnapshotOptions::default();

        generator.generate(&fixture.files, &fixture.output(), &options).await.unwrap();
        let first = std::fs::read_to_string(fixture.output()).unwrap();
        generator.generate(&fixture.files, &fixture.output(), &options).await.unwrap();
        let second = std::fs::read_to_string(fixture.output()).unwrap();

        assert_eq!(without_timestamp(&first), without_timestamp(&second));
    }

    #[tokio::test]
    async fn test_unreadable_file_gets_placeholder() {
        let fixture = Fixture::new();
        let mut files = fixture.files.clone();
        files.insert(1, FileDescriptor::resolve(fixture.temp.path(), "gone.x"));

        fixture
            .generator()
            .generate(&files, &fixture.output(), &SnapshotOptions::default())
            .await
            .unwrap();

        let doc = std::fs::read_to_string(fixture.output()).unwrap();
        assert!(doc.contains("### gone.x\n\n*(unreadable: Not found"));
        assert!(doc.contains("### b.x"));
    }

    #[tokio::test]
    async fn test_external_failure_falls_back_with_warning() {
        let fixture = Fixture::new();
        let generator = fixture.generator().with_external(ExternalGenerator::new(
            "false",
            vec![],
            Duration::from_secs(10),
        ));

        let report = generator
            .generate(&fixture.files, &fixture.output(), &SnapshotOptions::default())
            .await
            .unwrap();

        assert_eq!(report.strategy, SnapshotStrategy::Builtin);
        assert_eq!(report.warnings.len(), 1);
        let doc = std::fs::read_to_string(fixture.output()).unwrap();
        assert!(doc.contains("### a.x"));
        assert!(!fixture.temp.path().join("intent").join(SNAPSHOT_MANIFEST).exists());
    }

    #[tokio::test]
    async fn test_external_success_keeps_its_output() {
        let fixture = Fixture::new();
        let generator = fixture.generator().with_external(ExternalGenerator::new(
            "sh",
            vec![
                "-c".into(),
                r#"printf external > "$(dirname "$0")/codebase.md""#.into(),
            ],
            Duration::from_secs(10),
        ));

        let report = generator
            .generate(&fixture.files, &fixture.output(), &SnapshotOptions::default())
            .await
            .unwrap();

        assert_eq!(report.strategy, SnapshotStrategy::External);
        assert!(report.warnings.is_empty());
        assert_eq!(std::fs::read_to_string(fixture.output()).unwrap(), "external");
    }

    #[tokio::test]
    async fn test_archive_format_is_unsupported() {
        let fixture = Fixture::new();
        let options = SnapshotOptions {
            format: SnapshotFormat::Archive,
            ..Default::default()
        };
        let err = fixture
            .generator()
            .generate(&fixture.files, &fixture.output(), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, BriefError::Unsupported(_)));
    }
}
