//! Error types for upstream API calls
//!
//! Transport failures and malformed responses are the only error values the
//! crawl core sees. A single missing nested field is not an error: record
//! normalisation resolves it to `None`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("HTTP request failed: {url} - {message}")]
    Transport { url: String, message: String },

    #[error("HTTP error {status}: {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },
}

impl ApiError {
    pub fn transport(url: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn http_status(url: &str, status: u16) -> Self {
        Self::HttpStatus {
            url: url.to_string(),
            status,
        }
    }

    pub fn malformed(url: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Request error or non-success status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }

    /// The response arrived but did not have the expected JSON shape.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
