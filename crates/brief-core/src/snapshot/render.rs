use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::model::{FileCategory, SnapshotOptions, language_for};

/// Title of the snapshot document.
pub const SNAPSHOT_TITLE: &str = "# Codebase Snapshot";

const ROOT_GROUP: &str = "(root)";

/// The loaded form of one selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBody {
    Text { content: String, size: u64 },
    /// The file could not be read; the section records why.
    Unreadable { reason: String },
}

/// One file section of the snapshot, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub relative_path: String,
    pub body: EntryBody,
}

/// Renders the markdown snapshot document.
///
/// Sections follow `entries` order. The index is always sorted by directory
/// then file path, whatever the input order. Only the `Generated:` line
/// depends on anything but the entries.
pub fn render_markdown(
    entries: &[SnapshotEntry],
    options: &SnapshotOptions,
    generated_at: DateTime<Utc>,
) -> String {
    let mut doc = String::new();
    let _ = writeln!(doc, "{}\n", SNAPSHOT_TITLE);
    let _ = writeln!(
        doc,
        "Generated: {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(doc, "Files: {}\n", entries.len());

    if options.add_table_of_contents {
        doc.push_str("## Index\n\n");
        if options.categorize_by_type {
            render_index_by_category(&mut doc, entries);
        } else {
            render_index_by_directory(&mut doc, entries);
        }
        doc.push('\n');
    }

    doc.push_str("## Files\n\n");
    for entry in entries {
        render_section(&mut doc, entry, options);
    }

    doc
}

fn split_dir(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

fn sorted_paths<'a>(entries: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut paths: Vec<&str> = entries.collect();
    paths.sort_by(|a, b| split_dir(a).cmp(&split_dir(b)));
    paths.dedup();
    paths
}

fn render_index_by_directory(doc: &mut String, entries: &[SnapshotEntry]) {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for path in sorted_paths(entries.iter().map(|e| e.relative_path.as_str())) {
        groups.entry(split_dir(path).0).or_default().push(path);
    }

    for (dir, paths) in groups {
        if dir.is_empty() {
            let _ = writeln!(doc, "- **{}**", ROOT_GROUP);
        } else {
            let _ = writeln!(doc, "- **{}/**", dir);
        }
        for path in paths {
            let _ = writeln!(doc, "  - {}", path);
        }
    }
}

fn render_index_by_category(doc: &mut String, entries: &[SnapshotEntry]) {
    let mut groups: BTreeMap<FileCategory, Vec<&str>> = BTreeMap::new();
    for path in sorted_paths(entries.iter().map(|e| e.relative_path.as_str())) {
        groups.entry(FileCategory::detect(path)).or_default().push(path);
    }

    for (category, paths) in groups {
        let _ = writeln!(doc, "- **{}**", category.label());
        for path in paths {
            let _ = writeln!(doc, "  - {}", path);
        }
    }
}

fn render_section(doc: &mut String, entry: &SnapshotEntry, options: &SnapshotOptions) {
    let _ = writeln!(doc, "### {}\n", entry.relative_path);

    match &entry.body {
        EntryBody::Text { content, size } => {
            if options.include_metadata {
                let mime = mime_guess::from_path(&entry.relative_path).first_or_text_plain();
                let _ = writeln!(
                    doc,
                    "> Type: {} | Size: {} | SHA-256: {}\n",
                    mime,
                    human_size(*size),
                    short_digest(content)
                );
            }
            let fence = fence_for(content);
            let _ = writeln!(doc, "{}{}", fence, language_for(&entry.relative_path));
            doc.push_str(content);
            if !content.ends_with('\n') {
                doc.push('\n');
            }
            let _ = writeln!(doc, "{}\n", fence);
        }
        EntryBody::Unreadable { reason } => {
            let _ = writeln!(doc, "*(unreadable: {})*\n", reason);
        }
    }
}

/// A backtick fence longer than any backtick run inside `content`.
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for ch in content.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

fn short_digest(content: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(content.as_bytes()));
    digest[..12].to_string()
}

/// Formats a byte count as `B`, `KB` or `MB`.
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(path: &str, content: &str) -> SnapshotEntry {
        SnapshotEntry {
            relative_path: path.to_string(),
            body: EntryBody::Text {
                content: content.to_string(),
                size: content.len() as u64,
            },
        }
    }

    fn strip_timestamp(doc: &str) -> String {
        doc.lines()
            .filter(|line| !line.starts_with("Generated: "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_sections_follow_input_order() {
        let entries = vec![text("b.x", "bee"), text("a.x", "ay")];
        let doc = render_markdown(&entries, &SnapshotOptions::default(), Utc::now());

        let b = doc.find("### b.x").unwrap();
        let a = doc.find("### a.x").unwrap();
        assert!(b < a);
        assert!(doc.contains("Files: 2\n"));
        assert!(doc.contains("```text\nbee\n```"));
    }

    #[test]
    fn test_index_is_sorted_regardless_of_input_order() {
        let forward = vec![text("src/z.rs", ""), text("a.md", ""), text("src/b.rs", "")];
        let mut reversed = forward.clone();
        reversed.reverse();

        let index = |entries: &[SnapshotEntry]| {
            let doc = render_markdown(entries, &SnapshotOptions::default(), Utc::now());
            let start = doc.find("## Index").unwrap();
            let end = doc.find("## Files").unwrap();
            doc[start..end].to_string()
        };

        assert_eq!(index(&forward), index(&reversed));
        assert_eq!(
            index(&forward),
            "## Index\n\n- **(root)**\n  - a.md\n- **src/**\n  - src/b.rs\n  - src/z.rs\n\n"
        );
    }

    #[test]
    fn test_categorized_index() {
        let entries = vec![text("tests/it.rs", ""), text("src/lib.rs", ""), text("Cargo.toml", "")];
        let options = SnapshotOptions {
            categorize_by_type: true,
            ..Default::default()
        };
        let doc = render_markdown(&entries, &options, Utc::now());
        let source = doc.find("- **Source**").unwrap();
        let tests = doc.find("- **Tests**").unwrap();
        let config = doc.find("- **Configuration**").unwrap();
        assert!(source < tests && tests < config);
    }

    #[test]
    fn test_output_is_deterministic_except_timestamp() {
        let entries = vec![text("a.rs", "fn a() {}\n"), text("b.rs", "fn b() {}")];
        let options = SnapshotOptions::default();
        let first = render_markdown(&entries, &options, Utc::now());
        let second = render_markdown(
            &entries,
            &options,
            Utc::now() + chrono::Duration::seconds(5),
        );
        assert_ne!(first, second);
        assert_eq!(strip_timestamp(&first), strip_timestamp(&second));
    }

    #[test]
    fn test_metadata_line_and_toggles() {
        let entries = vec![text("src/lib.rs", "pub fn x() {}")];
        let doc = render_markdown(&entries, &SnapshotOptions::default(), Utc::now());
        assert!(doc.contains("> Type: "));
        assert!(doc.contains(" | Size: 13 B | SHA-256: "));

        let bare = SnapshotOptions {
            include_metadata: false,
            add_table_of_contents: false,
            ..Default::default()
        };
        let doc = render_markdown(&entries, &bare, Utc::now());
        assert!(!doc.contains("> Type:"));
        assert!(!doc.contains("## Index"));
        assert!(doc.contains("```rust\npub fn x() {}\n```"));
    }

    #[test]
    fn test_fence_outgrows_embedded_backticks() {
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("```rust\n```"), "````");
        assert_eq!(fence_for("`````"), "``````");
    }

    #[test]
    fn test_unreadable_entry_keeps_its_section() {
        let entries = vec![SnapshotEntry {
            relative_path: "gone.rs".into(),
            body: EntryBody::Unreadable {
                reason: "not found".into(),
            },
        }];
        let doc = render_markdown(&entries, &SnapshotOptions::default(), Utc::now());
        assert!(doc.contains("### gone.rs\n\n*(unreadable: not found)*"));
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(400), "400 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
    }
}
