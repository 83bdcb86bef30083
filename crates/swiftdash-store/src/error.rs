use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No home directory to derive a data directory from.
    #[error("no platform data directory available")]
    NoDataDir,

    #[error("filesystem: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema migration v{version:03} failed: {reason}")]
    Migration { version: u32, reason: String },

    /// A slot held something other than the expected JSON shape.
    #[error("slot payload: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
