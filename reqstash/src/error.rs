use reqstash_backend::BackendError;
use reqstash_core::Fingerprint;
use thiserror::Error;

use crate::fetch::FetchError;

/// Error type for caching client operations.
///
/// Each variant names the step that failed, so a caller can always tell a
/// store problem from an upstream problem.
#[derive(Debug, Error)]
pub enum Error {
    /// The store could not be consulted: it was unreachable or answered
    /// with something other than a value or "not found". Never retried.
    #[error("store lookup failed for {id}: {source}")]
    StoreLookup {
        /// Fingerprint being looked up.
        id: Fingerprint,
        /// Underlying backend failure.
        #[source]
        source: BackendError,
    },

    /// The upstream request kept failing until the retry budget ran out.
    #[error(transparent)]
    FetchExhausted(#[from] FetchError),

    /// Persisting a value failed. Never retried.
    #[error("store write failed for {id}: {source}")]
    StoreWrite {
        /// Fingerprint being written.
        id: Fingerprint,
        /// Underlying backend failure.
        #[source]
        source: BackendError,
    },

    /// A raw value handed to the store has no usable `requestId`.
    #[error("value has no valid `requestId` field")]
    MissingRequestId,

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The remote store backend could not be created.
    #[cfg(feature = "remote")]
    #[error(transparent)]
    Remote(#[from] reqstash_remote::Error),
}
