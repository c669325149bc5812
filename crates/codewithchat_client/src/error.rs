//! Errors surfaced by the client library.

/// Everything that can go wrong between a screen and the API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// Reading or writing local files (storage, profile picture).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Rejected locally before anything was sent.
    #[error("{0}")]
    InvalidInput(String),
}

impl ClientError {
    /// The server-provided message, if the API produced one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => Some(message.as_str()),
            _ => None,
        }
    }
}
