#![warn(missing_docs)]
//! # reqstash-core
//!
//! Core types for the reqstash caching client.
//!
//! This crate holds everything that is pure data or a seam to the outside
//! world, without doing any I/O itself:
//!
//! - [`RequestDescriptor`] - the caller-supplied description of an outbound request
//! - [`Fingerprint`] - the stable SHA-1 identifier derived from a descriptor
//! - [`Envelope`] - the uniform result returned for both cache hits and misses
//! - [`StoredValue`] - the form a result takes inside the backing store
//! - [`Transport`] - the trait used to perform the real outbound request
//!
//! ## Fingerprints
//!
//! Two descriptors that are equal after canonicalization always produce the
//! same fingerprint, no matter in which order their fields were inserted:
//!
//! ```
//! use reqstash_core::{Fingerprint, RequestDescriptor};
//!
//! let a = RequestDescriptor::get("http://x/")
//!     .url("a")
//!     .query("page", "1")
//!     .query("sort", "asc");
//! let b = RequestDescriptor::get("http://x/")
//!     .url("a")
//!     .query("sort", "asc")
//!     .query("page", "1");
//!
//! assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
//! ```

pub mod descriptor;
pub mod envelope;
pub mod fingerprint;
pub mod transport;

pub use descriptor::RequestDescriptor;
pub use envelope::{CACHED_FIELD, Envelope, Payload, REQUEST_ID_FIELD, STORE_ID_FIELD, StoredValue};
pub use fingerprint::{Fingerprint, InvalidFingerprint, canonical_form};
pub use transport::{BoxError, Transport, TransportError, TransportResponse};
