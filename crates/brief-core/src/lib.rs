pub mod config;
pub mod error;
pub mod event;
pub mod fs;
pub mod intent;
pub mod snapshot;
pub mod tokens;

// Re-export common error type
pub use error::{BriefError, Result};
