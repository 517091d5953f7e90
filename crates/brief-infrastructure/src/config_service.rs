//! Configuration service implementation.
//!
//! Loads `IntentConfig` from `config.toml` (see [`BriefPaths::config_file`])
//! and caches it.

use brief_core::config::IntentConfig;
use brief_core::error::{BriefError, Result};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::paths::BriefPaths;

/// Loads and caches the intent configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<IntentConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from the default config file location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(BriefPaths::config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing file yields defaults. A malformed or invalid file is an error.
    pub async fn get_config(&self) -> Result<IntentConfig> {
        {
            let cached = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = self.load().await?;
        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }

    async fn load(&self) -> Result<IntentConfig> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No config file, using defaults");
                return Ok(IntentConfig::default());
            }
            Err(e) => return Err(BriefError::from_io_at(e, &self.path)),
        };

        let config: IntentConfig = toml::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %self.path.display(), "Loaded config");
        Ok(config)
    }
}
