use thiserror::Error;

/// Error type shared by DentaCare binaries and infrastructure crates
#[derive(Error, Debug)]
pub enum DentaCareError {
    /// Network communication errors (bind, connect)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// HTTP server runtime errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Outbound email errors
    #[error("Email error: {0}")]
    EmailError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for DentaCare operations
pub type Result<T> = std::result::Result<T, DentaCareError>;

/// Log an error together with the operation it interrupted
pub fn log_error(context: &str, error: &DentaCareError) {
    tracing::error!(
        context = context,
        error = %error,
        "DentaCare error occurred"
    );
}
