//! Errors surfaced by the client library.

use thiserror::Error;

/// Anything that can go wrong talking to the server or persisting a session.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the server's error body, or the raw body.
        message: String,
    },

    /// The request never produced a response.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL could not be parsed or cannot carry a path.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// The call needs a signed-in session.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Reading or writing the session file failed.
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// The HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Result alias for client calls.
pub type ClientResult<T> = Result<T, ClientError>;
