use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type EmailResult<T> = Result<T, EmailError>;
