use error_common::ScribeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ScribeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnsupportedFileType(_)
            | StoreError::FileTooLarge { .. }
            | StoreError::InvalidId(_) => ScribeError::Validation(err.to_string()),
            StoreError::NotFound(msg) => ScribeError::NotFound(msg),
            other => ScribeError::Storage(other.to_string()),
        }
    }
}
