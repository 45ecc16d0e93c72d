mod error;
mod index;
mod project;
mod settings;
mod shared;
mod snapshot;
mod store;
mod worker;

pub use error::StorageError;
pub use index::{DEFAULT_MAX_STORED, InsertOutcome, RequestIndex};
pub use project::{
    CaptureConfig, LogFormat, LoggingConfig, PersistenceConfig, ReplayConfig, WorkspaceConfig,
    WorkspaceLayout, WorkspacePaths,
};
pub use settings::{SETTINGS_KEY, Settings, SettingsPatch, Theme, load_settings, save_settings};
pub use shared::SharedIndex;
pub use snapshot::{
    DEFAULT_RECENT_LIMIT, RECENT_REQUESTS_KEY, REQUEST_COUNT_KEY, RequestSnapshot, load_snapshot,
    restore_index,
};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use worker::{SnapshotHandle, SnapshotWorkerConfig, spawn_snapshot_worker};
