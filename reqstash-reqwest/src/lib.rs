//! Reqstash transport for the [reqwest](https://docs.rs/reqwest) HTTP client.
//!
//! [`ReqwestTransport`] turns a
//! [`RequestDescriptor`](reqstash_core::RequestDescriptor) into a real HTTP
//! request and reads the whole response, whatever its status. Deciding what
//! counts as a failure is left to the caller.
//!
//! ```no_run
//! use reqstash_core::{RequestDescriptor, Transport};
//! use reqstash_reqwest::ReqwestTransport;
//!
//! # async fn run() -> Result<(), reqstash_core::TransportError> {
//! let transport = ReqwestTransport::new();
//! let response = transport
//!     .send(&RequestDescriptor::get("https://api.example.com/").url("users"))
//!     .await?;
//! println!("{} {}", response.status, response.text());
//! # Ok(())
//! # }
//! ```

mod transport;

pub use transport::ReqwestTransport;

/// Re-export of the client type accepted by [`ReqwestTransport::with_client`].
pub use reqwest::Client;
