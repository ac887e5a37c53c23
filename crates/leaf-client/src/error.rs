//! Client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {detail}")]
    Status {
        status: u16,
        detail: String,
        /// Response body when it parsed as JSON
        body: Option<serde_json::Value>,
    },

    #[error("Invalid response body: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl ClientError {
    /// Server-side failures (5xx), as opposed to rejected requests.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ClientError::Status { status, .. } if *status >= 500)
    }
}
