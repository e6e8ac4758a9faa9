//! Provider error types.

use thiserror::Error;

use crate::schema::SchemaError;
use crate::waiter::WaitError;

/// Errors surfaced by resource operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Remote API failure (transport, return code, malformed body).
    #[error(transparent)]
    Api(#[from] nimbus_sdk::ApiError),

    /// Attribute map rejected by the resource schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Waiting for a status transition failed.
    #[error(transparent)]
    Wait(#[from] Box<WaitError>),

    /// Resource type is not available on the configured platform.
    #[error("{resource} is not supported on the {platform} platform")]
    UnsupportedPlatform {
        resource: &'static str,
        platform: &'static str,
    },

    /// The API returned no matching object where one was required.
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    /// A data-source query must resolve to exactly one result.
    #[error("query returned {count} results; refine the arguments to select one")]
    AmbiguousResult { count: usize },

    /// A filter block could not be applied.
    #[error("invalid filter on {name}: {reason}")]
    InvalidFilter { name: String, reason: String },

    /// Attribute combination rejected by a resource-specific rule.
    #[error("invalid attributes: {0}")]
    InvalidAttributes(String),
}

impl From<WaitError> for ProviderError {
    fn from(err: WaitError) -> Self {
        ProviderError::Wait(Box::new(err))
    }
}

impl ProviderError {
    /// Return code of an underlying API error, if any.
    pub fn return_code(&self) -> Option<&str> {
        match self {
            ProviderError::Api(err) => err.return_code(),
            ProviderError::Wait(err) => err.return_code(),
            _ => None,
        }
    }

    /// Whether the underlying API error carries one of the given codes.
    pub fn code_in(&self, codes: &[&str]) -> bool {
        self.return_code().is_some_and(|c| codes.contains(&c))
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
