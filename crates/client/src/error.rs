//! Error types for the client layer.
//!
//! [`ApiError`] describes a single failed HTTP exchange. The gateway maps it
//! into the narrower, cloneable errors the editor surfaces per page
//! ([`FetchError`]), per section ([`SaveError`]), and per field
//! ([`UploadError`]).

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("API error ({status}): {message}")]
    Status {
        status: u16,
        /// The body's `error` string when present, else the raw body.
        message: String,
    },

    /// A 2xx body could not be decoded into the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message suitable for showing next to a form or section.
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            Self::Request(_) => "Could not reach the server".to_string(),
            Self::Status { message, .. } => message.clone(),
            Self::Decode(_) => "The server sent an unexpected response".to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

/// A record or list could not be loaded. No partial data is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
    pub status: Option<u16>,
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        Self {
            message: err.user_message(),
            status: err.status(),
        }
    }
}

/// A section save failed. Local edits are left intact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Saving '{section_id}' failed: {message}")]
pub struct SaveError {
    pub section_id: String,
    pub message: String,
}

/// An image upload failed. Only the named field is affected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Upload for '{path}' failed: {message}")]
pub struct UploadError {
    pub path: String,
    pub message: String,
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}
