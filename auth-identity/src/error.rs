use error_common::ScribeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    /// Deliberately the same for unknown email and wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Hashing error")]
    HashingError,

    #[error("User store error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("User store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IdentityError>;

impl From<IdentityError> for ScribeError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials | IdentityError::UserAlreadyExists => {
                ScribeError::Authentication(err.to_string())
            }
            IdentityError::MissingField(_)
            | IdentityError::InvalidEmail
            | IdentityError::WeakPassword(_) => ScribeError::Validation(err.to_string()),
            IdentityError::HashingError => ScribeError::Internal(err.to_string()),
            IdentityError::Storage(_) | IdentityError::Corrupt(_) => {
                ScribeError::Storage(err.to_string())
            }
        }
    }
}
