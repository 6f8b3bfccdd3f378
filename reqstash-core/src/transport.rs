//! Outbound transport abstraction.
//!
//! The caching client never talks to the network directly. It hands the
//! descriptor to a [`Transport`], which performs the request and reports
//! either a response (of any status) or a transport-level failure. Keeping
//! these two outcomes apart lets the retry loop treat both uniformly
//! without guessing what went wrong.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::descriptor::RequestDescriptor;
use crate::envelope::{Payload, payload_from_body};

/// Boxed error type carried by transport and backend failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Response produced by a [`Transport`].
#[derive(Clone, Debug)]
pub struct TransportResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Fully read response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Creates a response without headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        TransportResponse {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns `true` for statuses in `[200, 300)`.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Returns the body as payload fields.
    pub fn payload(&self) -> Payload {
        payload_from_body(&self.body)
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failure: no usable response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(#[source] BoxError),

    /// No response arrived in time.
    #[error("request timed out: {0}")]
    Timeout(#[source] BoxError),

    /// The descriptor could not be turned into a request.
    #[error("invalid request: {0}")]
    Request(#[source] BoxError),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[source] BoxError),

    /// Any other failure.
    #[error(transparent)]
    Other(BoxError),
}

impl TransportError {
    /// Wraps a message as an invalid-request error.
    pub fn request(message: impl Into<String>) -> Self {
        TransportError::Request(message.into().into())
    }
}

/// Performs outbound requests described by a [`RequestDescriptor`].
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use http::StatusCode;
/// use reqstash_core::{RequestDescriptor, Transport, TransportError, TransportResponse};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl Transport for Fixed {
///     async fn send(
///         &self,
///         _request: &RequestDescriptor,
///     ) -> Result<TransportResponse, TransportError> {
///         Ok(TransportResponse::new(StatusCode::OK, r#"{"foo":1}"#))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request, returning the response whatever its status.
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError>;

    /// Returns the name of this transport for diagnostics.
    fn name(&self) -> &str {
        "transport"
    }
}

#[async_trait]
impl Transport for &dyn Transport {
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        (*self).send(request).await
    }

    fn name(&self) -> &str {
        (*self).name()
    }
}

#[async_trait]
impl Transport for Box<dyn Transport> {
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl Transport for Arc<dyn Transport> {
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        (**self).send(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
