//! Path management for brief configuration and intent folders.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/brief/             # Config directory
//! └── config.toml              # IntentConfig
//!
//! <workspace>/.brief/intents/  # Default intents root
//! └── <name>/                  # One folder per intent
//! ```

use brief_core::error::{BriefError, Result};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "BRIEF_CONFIG";

const APP_DIR: &str = "brief";
const WORKSPACE_DIR: &str = ".brief";
const INTENTS_DIR: &str = "intents";

pub struct BriefPaths;

impl BriefPaths {
    /// Returns `~/.config/brief/` (platform config dir).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| BriefError::config("Cannot find config directory"))
    }

    /// Returns the config file path, honouring `BRIEF_CONFIG`.
    pub fn config_file() -> Result<PathBuf> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Ok(Self::config_dir()?.join("config.toml")),
        }
    }

    /// Returns `<workspace>/.brief/intents`.
    pub fn intents_root(workspace_root: &Path) -> PathBuf {
        workspace_root.join(WORKSPACE_DIR).join(INTENTS_DIR)
    }
}
