//! Outbound request descriptors.
//!
//! A [`RequestDescriptor`] is the caller's description of a request: an
//! optional method, an optional base location, an optional sub-path and any
//! number of additional fields. The additional fields are opaque to the
//! fingerprinter, which hashes them as they are, while the transport gives
//! meaning to a few well-known ones:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `headers` | Object of header names to string values |
//! | `qs` | Object of query parameters appended to the location |
//! | `json` | Object or array sent as a JSON body (`true` only asks for JSON back) |
//! | `body` | String sent verbatim as the request body |
//!
//! The serialized form uses the same camelCase names callers send over the
//! wire (`method`, `baseUrl`, `url`, ...), so descriptors can be read from
//! JSON or YAML directly.
//!
//! ```
//! use reqstash_core::RequestDescriptor;
//!
//! let descriptor = RequestDescriptor::get("https://api.example.com/")
//!     .url("users/42")
//!     .header("accept", "application/json");
//!
//! assert_eq!(descriptor.effective_method(), "GET");
//! assert_eq!(
//!     descriptor.location().as_deref(),
//!     Some("https://api.example.com/users/42")
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Method assumed when a descriptor does not name one.
pub const DEFAULT_METHOD: &str = "GET";

/// Well-known extra field holding request headers.
pub const HEADERS_FIELD: &str = "headers";
/// Well-known extra field holding query parameters.
pub const QUERY_FIELD: &str = "qs";
/// Well-known extra field holding a JSON body.
pub const JSON_FIELD: &str = "json";
/// Well-known extra field holding a raw string body.
pub const BODY_FIELD: &str = "body";

/// Caller-supplied description of an outbound request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl RequestDescriptor {
    /// Creates an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `GET` descriptor against the given base location.
    pub fn get(base_url: impl Into<String>) -> Self {
        Self::new().method("GET").base_url(base_url)
    }

    /// Creates a `POST` descriptor against the given base location.
    pub fn post(base_url: impl Into<String>) -> Self {
        Self::new().method("POST").base_url(base_url)
    }

    /// Sets the request method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets the base location.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the sub-path appended to the base location.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Adds a request header.
    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.nested(HEADERS_FIELD, name.into(), Value::String(value.into()))
    }

    /// Adds a query parameter.
    pub fn query(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.nested(QUERY_FIELD, name.into(), value.into())
    }

    /// Sets a JSON body.
    pub fn json(self, body: impl Into<Value>) -> Self {
        self.field(JSON_FIELD, body)
    }

    /// Sets a raw string body.
    pub fn body(self, body: impl Into<String>) -> Self {
        self.field(BODY_FIELD, Value::String(body.into()))
    }

    /// Sets an arbitrary field.
    ///
    /// `method`, `baseUrl` and `url` are routed to their dedicated slots when
    /// given as strings, so a descriptor built field by field is equal to
    /// one built with the typed setters.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        match (name.as_str(), value.into()) {
            ("method", Value::String(method)) => self.method = Some(method),
            ("baseUrl", Value::String(base_url)) => self.base_url = Some(base_url),
            ("url", Value::String(url)) => self.url = Some(url),
            (_, value) => {
                self.extra.insert(name, value);
            }
        }
        self
    }

    fn nested(mut self, field: &str, name: String, value: Value) -> Self {
        let entry = self
            .extra
            .entry(field.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(name, value);
        }
        self
    }

    /// Returns the method as given by the caller, if any.
    ///
    /// An empty string counts as absent.
    pub fn method_str(&self) -> Option<&str> {
        self.method.as_deref().filter(|method| !method.is_empty())
    }

    /// Returns the method to send, uppercased, defaulting to `GET`.
    pub fn effective_method(&self) -> String {
        self.method_str()
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| DEFAULT_METHOD.to_owned())
    }

    /// Returns the base location, if any.
    pub fn base_url_str(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|base| !base.is_empty())
    }

    /// Returns the sub-path, if any.
    pub fn url_str(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// Returns the combined location.
    ///
    /// Base and sub-path are concatenated verbatim: no slash is inserted or
    /// removed, so `"http://x"` + `"a"` gives `"http://xa"`.
    pub fn location(&self) -> Option<String> {
        match (self.base_url_str(), self.url_str()) {
            (Some(base), Some(url)) => Some(format!("{base}{url}")),
            (Some(base), None) => Some(base.to_owned()),
            (None, Some(url)) => Some(url.to_owned()),
            (None, None) => None,
        }
    }

    /// Returns the URL a transport should send the request to.
    ///
    /// Unlike [`location`](Self::location), base and sub-path are joined
    /// with exactly one slash: `"http://x"` + `"a"` and `"http://x/"` +
    /// `"/a"` both give `"http://x/a"`. Only the hashed location is kept
    /// verbatim.
    pub fn request_url(&self) -> Option<String> {
        match (self.base_url_str(), self.url_str()) {
            (Some(base), Some(url)) => {
                let joined = match (base.ends_with('/'), url.starts_with('/')) {
                    (true, true) => format!("{base}{}", &url[1..]),
                    (false, false) => format!("{base}/{url}"),
                    _ => format!("{base}{url}"),
                };
                Some(joined)
            }
            (Some(base), None) => Some(base.to_owned()),
            (None, Some(url)) => Some(url.to_owned()),
            (None, None) => None,
        }
    }

    /// Returns the additional fields.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Returns a single additional field.
    pub fn extra_field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}
