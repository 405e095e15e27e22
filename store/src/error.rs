use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("version {0} does not exist")]
    VersionNotFound(u64),

    #[error("version {0} is the working version and cannot be deleted")]
    VersionInUse(u64),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}
