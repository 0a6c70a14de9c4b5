use thiserror::Error;

/// Errors returned by every client call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Upstream answered with a non-success status. Displays as the most
    /// specific message the response carried.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Success response whose body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client is missing a base URL or was given an unusable one.
    #[error("{0}")]
    Config(String),

    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// HTTP status for `Api` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
