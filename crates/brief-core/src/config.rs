//! Intent lifecycle configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BriefError, Result};
use crate::snapshot::SnapshotOptions;
use crate::tokens::DEFAULT_TOKEN_LIMIT;

/// What happens to the generated documents when an intent is archived.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ArchivePolicy {
    /// Keep `intent.md` and `codebase.md`
    #[default]
    Retain,
    /// Delete `intent.md` and `codebase.md`; the metadata document stays
    PurgeDocuments,
}

/// Configuration consumed by sessions and the snapshot generator.
///
/// Every field has a default, so a partial `config.toml` is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct IntentConfig {
    pub use_external_generator: bool,
    pub external_runtime_path: String,
    /// Arguments placed before the manifest path
    pub external_args: Vec<String>,
    pub external_timeout_secs: u64,
    pub token_limit: u64,
    pub auto_save_debounce_ms: u64,
    pub auto_save_max_retries: u32,
    pub archive_policy: ArchivePolicy,
    pub snapshot: SnapshotOptions,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            use_external_generator: false,
            external_runtime_path: String::new(),
            external_args: Vec::new(),
            external_timeout_secs: 60,
            token_limit: DEFAULT_TOKEN_LIMIT,
            auto_save_debounce_ms: 2000,
            auto_save_max_retries: 3,
            archive_policy: ArchivePolicy::Retain,
            snapshot: SnapshotOptions::default(),
        }
    }
}

impl IntentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.token_limit == 0 {
            return Err(BriefError::config("token_limit must be greater than zero"));
        }
        if self.use_external_generator && self.external_runtime_path.trim().is_empty() {
            return Err(BriefError::config(
                "external_runtime_path is required when use_external_generator is set",
            ));
        }
        if self.auto_save_debounce_ms == 0 {
            return Err(BriefError::config(
                "auto_save_debounce_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.auto_save_debounce_ms)
    }

    pub fn external_timeout(&self) -> Duration {
        Duration::from_secs(self.external_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: IntentConfig = toml::from_str(
            r#"
            use_external_generator = true
            external_runtime_path = "node"
            archive_policy = "purge-documents"

            [snapshot]
            categorize_by_type = true
            "#,
        )
        .unwrap();

        assert!(config.use_external_generator);
        assert_eq!(config.external_timeout_secs, 60);
        assert_eq!(config.token_limit, 100_000);
        assert_eq!(config.archive_policy, ArchivePolicy::PurgeDocuments);
        assert!(config.snapshot.categorize_by_type);
        assert!(config.snapshot.include_metadata);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = IntentConfig {
            token_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = IntentConfig {
            use_external_generator: true,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = IntentConfig {
            auto_save_debounce_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(IntentConfig::default().validate().is_ok());
    }
}
