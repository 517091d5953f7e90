//! Error types for Brief.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every Brief crate.
///
/// Variants follow the failure taxonomy of the intent lifecycle:
/// missing documents, per-file I/O, external generator failures and
/// rejected caller input.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BriefError {
    /// Referenced intent, document or file is absent (or unparsable).
    #[error("Not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Caller-supplied name or content failed basic rules.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// External generator exited non-zero, timed out, or produced nothing.
    #[error("Subprocess failed: {0}")]
    Subprocess(String),

    /// Operation exists in the interface but is not implemented.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Another session already holds the intent folder.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BriefError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Subprocess error
    pub fn subprocess(message: impl Into<String>) -> Self {
        Self::Subprocess(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Converts an IO error for `path`, keeping "not found" distinguishable.
    pub fn from_io_at(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found("File", path.display().to_string())
        } else {
            Self::Io {
                message: format!("{}: {} (kind: {:?})", path.display(), err, err.kind()),
            }
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a subprocess error
    pub fn is_subprocess(&self) -> bool {
        matches!(self, Self::Subprocess(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for BriefError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for BriefError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for BriefError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for BriefError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, BriefError>`.
pub type Result<T> = std::result::Result<T, BriefError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let mapped = BriefError::from_io_at(err, Path::new("src/a.rs"));
        assert!(mapped.is_not_found());
        assert_eq!(mapped.to_string(), "Not found: File 'src/a.rs'");
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let mapped = BriefError::from_io_at(err, Path::new("secret"));
        assert!(mapped.is_io());
        assert!(mapped.to_string().contains("PermissionDenied"));
    }
}
