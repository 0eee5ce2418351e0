use thiserror::Error;

/// Rejections of a single user action. None of these are fatal to the process.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("end time {end} must be after start time {start}")]
    InvalidRange { start: String, end: String },
    #[error("a {kind} named '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },
    #[error("document does not match any known schema: {0}")]
    Schema(String),
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),
    #[error("price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
    #[error("could not read '{0}' as a time or date")]
    InvalidTime(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("data storage is unavailable, reconnect before making further changes")]
    SessionHalted,
}

/// Failures of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("catalog file could not be accessed: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("catalog data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog file could not be replaced: {0}")]
    Persist(#[from] tempfile::PersistError),
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
