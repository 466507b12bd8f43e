use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoopError {
    #[error("Missing required table: {0}")]
    MissingTable(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Malformed document {path}: {reason}")]
    MalformedDocument { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
