use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit storage error: {0}")]
    StorageError(String),

    #[error("Audit record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
