use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output format of the snapshot document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Markdown,
    /// Packaged archive. Declared but not implemented.
    Archive,
}

/// Rendering switches for snapshot generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotOptions {
    pub format: SnapshotFormat,
    /// Emit a type/size/digest line under each file title
    pub include_metadata: bool,
    /// Emit the index section
    pub add_table_of_contents: bool,
    /// Group the index by detected category instead of directory
    pub categorize_by_type: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            format: SnapshotFormat::Markdown,
            include_metadata: true,
            add_table_of_contents: true,
            categorize_by_type: false,
        }
    }
}

/// A file selected for the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Workspace-relative path, used for titles and the index
    pub relative_path: String,
    /// Location the content is read from
    pub absolute_path: PathBuf,
}

impl FileDescriptor {
    pub fn new(relative_path: impl Into<String>, absolute_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            absolute_path: absolute_path.into(),
        }
    }

    /// Resolves `relative_path` against `workspace_root`.
    pub fn resolve(workspace_root: &Path, relative_path: &str) -> Self {
        Self::new(relative_path, crate::fs::resolve(workspace_root, relative_path))
    }
}

/// Coarse file category used by `categorize_by_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileCategory {
    Source,
    Test,
    Config,
    Docs,
    Style,
    Markup,
    Data,
    Script,
    Other,
}

impl FileCategory {
    pub fn detect(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        let file_name = lower.rsplit('/').next().unwrap_or(&lower);

        if lower.contains("/tests/")
            || lower.starts_with("tests/")
            || file_name.contains(".test.")
            || file_name.contains(".spec.")
            || file_name.contains("_test.")
        {
            return Self::Test;
        }

        match file_name {
            "cargo.toml" | "package.json" | "dockerfile" | "makefile" | ".gitignore" => {
                return Self::Config;
            }
            _ => {}
        }

        match extension(&lower).as_deref() {
            Some(
                "rs" | "ts" | "tsx" | "js" | "jsx" | "py" | "go" | "java" | "kt" | "c" | "h"
                | "cpp" | "hpp" | "cs" | "swift" | "rb" | "php" | "dart",
            ) => Self::Source,
            Some("toml" | "yaml" | "yml" | "ini" | "cfg" | "conf" | "env" | "lock") => Self::Config,
            Some("md" | "markdown" | "txt" | "rst" | "adoc") => Self::Docs,
            Some("css" | "scss" | "sass" | "less") => Self::Style,
            Some("html" | "htm" | "xml" | "svg" | "vue" | "svelte") => Self::Markup,
            Some("json" | "csv" | "tsv" | "sql" | "graphql") => Self::Data,
            Some("sh" | "bash" | "zsh" | "ps1" | "bat") => Self::Script,
            _ => Self::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Test => "Tests",
            Self::Config => "Configuration",
            Self::Docs => "Documentation",
            Self::Style => "Styles",
            Self::Markup => "Markup",
            Self::Data => "Data",
            Self::Script => "Scripts",
            Self::Other => "Other",
        }
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Code-fence language tag for a path. Unknown extensions map to `text`.
pub fn language_for(path: &str) -> &'static str {
    match extension(path).as_deref() {
        Some("rs") => "rust",
        Some("ts" | "tsx") => "typescript",
        Some("js" | "jsx" | "mjs" | "cjs") => "javascript",
        Some("py") => "python",
        Some("go") => "go",
        Some("java") => "java",
        Some("kt") => "kotlin",
        Some("c" | "h") => "c",
        Some("cpp" | "hpp" | "cc") => "cpp",
        Some("cs") => "csharp",
        Some("swift") => "swift",
        Some("rb") => "ruby",
        Some("php") => "php",
        Some("dart") => "dart",
        Some("css") => "css",
        Some("scss") => "scss",
        Some("html" | "htm") => "html",
        Some("xml" | "svg") => "xml",
        Some("json") => "json",
        Some("yml" | "yaml") => "yaml",
        Some("toml") => "toml",
        Some("md" | "markdown") => "markdown",
        Some("sql") => "sql",
        Some("sh" | "bash" | "zsh") => "bash",
        _ => "text",
    }
}
