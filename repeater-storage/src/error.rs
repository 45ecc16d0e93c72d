use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("snapshot worker stopped")]
    WorkerStopped,
}
