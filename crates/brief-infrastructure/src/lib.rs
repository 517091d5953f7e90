pub mod config_service;
pub mod external_generator;
pub mod local_fs;
pub mod metadata_store;
pub mod paths;
pub mod snapshot_generator;

pub use config_service::ConfigService;
pub use external_generator::{ExternalGenerator, SnapshotManifest};
pub use local_fs::LocalFileSystem;
pub use metadata_store::FsMetadataStore;
pub use paths::BriefPaths;
pub use snapshot_generator::{SnapshotGenerator, SnapshotReport, SnapshotStrategy};
