//! Error types for remote store operations.
//!
//! All errors can be converted to [`BackendError`] for uniform error
//! handling across backends.
//!
//! [`BackendError`]: reqstash_backend::BackendError

use reqstash_backend::BackendError;

/// Error type for remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying HTTP client.
    ///
    /// This includes connection failures, timeouts and broken responses.
    #[error("Remote store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The configured store URL cannot be used as a base URL.
    #[error("Invalid store URL {url:?}: {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Store URL was not specified when building the backend.
    ///
    /// Call [`RemoteBackendBuilder::url`] before [`RemoteBackendBuilder::build`].
    ///
    /// [`RemoteBackendBuilder::url`]: crate::RemoteBackendBuilder::url
    /// [`RemoteBackendBuilder::build`]: crate::RemoteBackendBuilder::build
    #[error("Store URL not specified. Call .url() before .build()")]
    MissingUrl,
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        match error {
            Error::Request(_) => Self::ConnectionError(Box::new(error)),
            _ => Self::InternalError(Box::new(error)),
        }
    }
}
