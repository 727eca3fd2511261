//! Server-related error types.

/// Errors that can occur while operating the tracker server.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {

    /// Could not bind the configured listen address
    #[error("Failed to bind listener: {0}")]
    Bind(#[from] std::io::Error),

    /// The server is already running
    #[error("Server is already listening")]
    AlreadyListening
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
