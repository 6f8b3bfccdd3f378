//! Error types for backend operations.

use http::StatusCode;
use reqstash_core::BoxError;
use thiserror::Error;

/// Error type for backend operations.
///
/// This enum categorizes errors that can occur during store interactions
/// into distinct groups for appropriate handling. A missing entry is not
/// an error: backends report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(BoxError),

    /// Network interaction error.
    ///
    /// The store could not be reached or the exchange broke off.
    #[error(transparent)]
    ConnectionError(BoxError),

    /// The store answered with a status other than success or not-found.
    #[error("store responded with unexpected status {status}")]
    UnexpectedStatus {
        /// Status returned by the store.
        status: StatusCode,
        /// Response body, kept for diagnostics.
        body: String,
    },

    /// Serialization or deserialization error.
    #[error(transparent)]
    FormatError(#[from] serde_json::Error),
}
