#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! # reqstash
//!
//! A caching proxy client. Every outbound request is reduced to a stable
//! [`Fingerprint`]; the fingerprint is looked up in a remote key-value
//! store and the upstream is only called on a miss, with fixed-delay
//! retries. Cache hits and fresh results come back in the same
//! [`Envelope`], tagged with `requestId` and `cached`.
//!
//! ```no_run
//! use reqstash::{Config, RequestDescriptor, StoreClient};
//!
//! # async fn run() -> Result<(), reqstash::Error> {
//! let config = Config::from_yaml(
//!     r#"
//!     storeUrl: http://127.0.0.1:8080/cache
//!     retry: 2
//!     retryDelay: 100ms
//!     "#,
//! )?;
//! let client = StoreClient::from_config(&config)?;
//!
//! let envelope = client
//!     .request(&RequestDescriptor::get("https://api.example.com/").url("users"))
//!     .await?;
//!
//! // Persist fresh results; cached ones are skipped.
//! client.store(&envelope).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Fingerprint** - canonicalize the descriptor and hash it with SHA-1
//! 2. **Lookup** - read the store; "not found" is a miss, anything else
//!    unexpected is an [`Error::StoreLookup`]
//! 3. **Fetch** - on a miss, call the upstream through a [`Transport`],
//!    retrying per [`RetryPolicy`]; exhaustion is an [`Error::FetchExhausted`]
//! 4. **Store** - the caller decides whether to persist the envelope
//!
//! ## Diagnostics
//!
//! The client emits [`tracing`](https://docs.rs/tracing) events and spans
//! (`reqstash.request`, `reqstash.store`) carrying the `request_id`. Install
//! whichever subscriber suits the application.
//!
//! ## Feature Flags
//!
//! - `remote` (default) - HTTP key-value store backend
//! - `reqwest` (default) - reqwest transport; with `remote`, enables
//!   [`StoreClient::from_config`]

/// The caching client and its builder.
pub mod client;

/// Client configuration.
pub mod config;

/// Error types for client operations.
pub mod error;

/// Resilient fetching with fixed-delay retry.
pub mod fetch;

pub use client::{NotSet, StoreClient, StoreClientBuilder};
pub use config::{Config, ConfigBuilder};
pub use error::Error;
pub use fetch::{AttemptError, FetchError, RetryPolicy};

pub use reqstash_backend::{Backend, BackendError, BackendResult, MemoryBackend};
pub use reqstash_core::{
    Envelope, Fingerprint, Payload, RequestDescriptor, StoredValue, Transport, TransportError,
    TransportResponse,
};

/// Backend implementations.
pub mod backend {
    pub use reqstash_backend::{Backend, BackendError, BackendResult, MemoryBackend};
    #[cfg(feature = "remote")]
    #[cfg_attr(docsrs, doc(cfg(feature = "remote")))]
    pub use reqstash_remote::{RemoteBackend, RemoteBackendBuilder};
}

/// Transport implementations.
pub mod transport {
    pub use reqstash_core::{Transport, TransportError, TransportResponse};
    #[cfg(feature = "reqwest")]
    #[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
    pub use reqstash_reqwest::ReqwestTransport;
}

/// The `reqstash` prelude.
///
/// ```rust
/// use reqstash::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Envelope, Error, RequestDescriptor, StoreClient};
}
