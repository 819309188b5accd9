//! Error types for the command-line front end.

/// Errors raised while turning a payload into SQL.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The payload is not valid JSON or does not have the expected shape.
    #[error("Invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the payload failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload is well-formed JSON but inconsistent.
    #[error("Invalid payload: {0}")]
    Payload(String),

    /// Statement generation rejected the request.
    #[error(transparent)]
    Sql(#[from] sqlweave_core::Error),
}

/// Result type for the command-line front end.
pub type Result<T> = std::result::Result<T, CliError>;
