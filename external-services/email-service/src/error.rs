use error_common::ScribeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Email sending is disabled")]
    Disabled,

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Mailbox error: {0}")]
    Mailbox(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EmailResult<T> = Result<T, EmailError>;

impl From<EmailError> for ScribeError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::InvalidRecipient(msg) => ScribeError::Validation(msg),
            other => ScribeError::Email(other.to_string()),
        }
    }
}
