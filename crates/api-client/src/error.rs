// In crates/api-client/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the API client: {0}")]
    ClientBuildError(#[source] reqwest::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    #[error("API error: HTTP {status}, msg: {msg}")]
    ApiError { status: u16, msg: String },
    #[error("Response is missing the `{0}` field")]
    MissingField(&'static str),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl Error {
    /// Transport failures and server errors are worth another attempt; client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RequestFailed(e) => e.status().is_none_or(|s| s.is_server_error()),
            Error::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
