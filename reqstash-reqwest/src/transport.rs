//! Transport implementation over reqwest.

use async_trait::async_trait;
use reqstash_core::descriptor::{BODY_FIELD, HEADERS_FIELD, JSON_FIELD, QUERY_FIELD};
use reqstash_core::{RequestDescriptor, Transport, TransportError, TransportResponse};
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, Method, Request, Url};
use serde_json::Value;
use tracing::trace;

/// Transport that performs requests with a [`reqwest::Client`].
///
/// The well-known descriptor fields are mapped as follows:
///
/// - `headers`: each entry becomes a request header
/// - `qs`: each entry becomes a query parameter (arrays repeat the key)
/// - `json`: objects and arrays are sent as a JSON body; `true` only sets
///   `Accept: application/json`
/// - `body`: a string sent verbatim
///
/// A `json` object or array cannot be combined with a `body` string; such a
/// descriptor is rejected with [`TransportError::Request`]. The URL is
/// [`RequestDescriptor::request_url`], which joins base and sub-path with a
/// single slash.
///
/// Other fields take part in the fingerprint but are not sent.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport around a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Builds the reqwest request for a descriptor without sending it.
    pub fn build_request(&self, descriptor: &RequestDescriptor) -> Result<Request, TransportError> {
        let method = Method::from_bytes(descriptor.effective_method().as_bytes())
            .map_err(|err| TransportError::Request(Box::new(err)))?;
        let location = descriptor
            .request_url()
            .ok_or_else(|| TransportError::request("descriptor has no location"))?;
        let url = Url::parse(&location).map_err(|err| {
            TransportError::request(format!("invalid location {location:?}: {err}"))
        })?;

        let mut builder = self.client.request(method, url);

        if let Some(Value::Object(headers)) = descriptor.extra_field(HEADERS_FIELD) {
            for (name, value) in headers {
                if let Some(value) = scalar_to_string(value) {
                    builder = builder.header(name.as_str(), value);
                }
            }
        }

        if let Some(Value::Object(query)) = descriptor.extra_field(QUERY_FIELD) {
            let mut pairs = Vec::with_capacity(query.len());
            for (name, value) in query {
                match value {
                    Value::Array(items) => pairs.extend(
                        items
                            .iter()
                            .filter_map(scalar_to_string)
                            .map(|item| (name.clone(), item)),
                    ),
                    other => pairs.extend(scalar_to_string(other).map(|item| (name.clone(), item))),
                }
            }
            builder = builder.query(&pairs);
        }

        let raw_body = match descriptor.extra_field(BODY_FIELD) {
            Some(Value::String(body)) => Some(body),
            _ => None,
        };
        match (descriptor.extra_field(JSON_FIELD), raw_body) {
            (Some(Value::Object(_) | Value::Array(_)), Some(_)) => {
                return Err(TransportError::request(
                    "descriptor sets both a `json` body and a `body` string",
                ));
            }
            (Some(body @ (Value::Object(_) | Value::Array(_))), None) => {
                builder = builder.json(body);
            }
            (json, body) => {
                if json == Some(&Value::Bool(true)) {
                    builder =
                        builder.header(ACCEPT, HeaderValue::from_static("application/json"));
                }
                if let Some(body) = body {
                    builder = builder.body(body.clone());
                }
            }
        }

        builder.build().map_err(classify)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(Box::new(err))
    } else if err.is_connect() {
        TransportError::Connect(Box::new(err))
    } else if err.is_builder() {
        TransportError::Request(Box::new(err))
    } else if err.is_body() || err.is_decode() {
        TransportError::Body(Box::new(err))
    } else {
        TransportError::Other(Box::new(err))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        let request = self.build_request(descriptor)?;
        trace!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.client.execute(request).await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Body(Box::new(err)))?;

        trace!(%status, bytes = body.len(), "received response");
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}
