//! Transport error taxonomy.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur while talking to the backend.
///
/// All four classes are recoverable at the component boundary; none of them
/// is allowed to take the process down.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never reached the server, or the connection dropped
    /// before a response arrived.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned status {status}: {message}")]
    Server { status: u16, message: String },

    /// A response body did not match the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The chat body failed while being read.
    #[error("stream interrupted: {0}")]
    Stream(String),
}
