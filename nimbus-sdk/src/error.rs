//! SDK error types.

use thiserror::Error;

/// Errors surfaced by API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or protocol-level failure.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-zero return code.
    #[error("API error {return_code}: {return_message} (request {})", request_id.as_deref().unwrap_or("-"))]
    Api {
        return_code: String,
        return_message: String,
        request_id: Option<String>,
    },

    /// The error body could not be parsed. Fatal, never retryable.
    #[error("malformed error body: {0}")]
    MalformedErrorBody(String),

    /// A success body did not match the expected response shape.
    #[error("decoding {action} response: {source}")]
    Decode {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Numeric return code of an API-level error, if any.
    pub fn return_code(&self) -> Option<&str> {
        match self {
            ApiError::Api { return_code, .. } => Some(return_code),
            _ => None,
        }
    }

    /// Whether this is an API-level error carrying one of the given codes.
    pub fn code_in(&self, codes: &[&str]) -> bool {
        self.return_code().is_some_and(|c| codes.contains(&c))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
