use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Hash computation failed: {0}")]
    HashFailed(String),

    #[error("Invalid password hash format: {0}")]
    InvalidFormat(String),

    #[error("Invalid hashing parameters: {0}")]
    Configuration(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
