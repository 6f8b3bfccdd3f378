//! Reqstash backend for HTTP key-value store services.
//!
//! [`RemoteBackend`] talks to a store exposing one resource per
//! fingerprint under a base URL:
//!
//! | Request | Store answer | Backend result |
//! |---------|--------------|----------------|
//! | `GET {url}/{id}` | `200` + JSON | `Ok(Some(value))` |
//! | `GET {url}/{id}` | `404` | `Ok(None)` |
//! | `GET {url}/{id}` | anything else | `Err(UnexpectedStatus)` |
//! | `POST {url}/{id}` + JSON | `2xx` | `Ok(())` |
//! | `POST {url}/{id}` + JSON | anything else | `Err(UnexpectedStatus)` |
//!
//! Failing to reach the store at all is reported as
//! [`BackendError::ConnectionError`](reqstash_backend::BackendError::ConnectionError).
//!
//! ```no_run
//! use reqstash_remote::RemoteBackend;
//!
//! # fn main() -> Result<(), reqstash_remote::Error> {
//! let backend = RemoteBackend::builder()
//!     .url("http://127.0.0.1:8080/cache")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod backend;
pub mod error;

pub use backend::{RemoteBackend, RemoteBackendBuilder};
pub use error::Error;
