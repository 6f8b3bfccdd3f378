//! Result envelopes and stored values.
//!
//! Every call to the caching client returns an [`Envelope`], whether the
//! data came from the store or from the network. On the wire an envelope is
//! a single flat JSON object: the payload fields plus two injected fields,
//! `requestId` and `cached`.
//!
//! ```
//! use reqstash_core::{Envelope, Fingerprint, RequestDescriptor, StoredValue};
//! use serde_json::json;
//!
//! let id = Fingerprint::of(&RequestDescriptor::get("http://x/"));
//! let stored = StoredValue::from_store(json!({"_id": 7, "foo": 1}));
//! let envelope = Envelope::from_store(id.clone(), stored);
//!
//! assert_eq!(
//!     serde_json::to_value(&envelope).unwrap(),
//!     json!({"foo": 1, "requestId": id.as_str(), "cached": true})
//! );
//! ```
//!
//! A [`StoredValue`] is what actually lives in the store: the payload with
//! the injected fields removed, and without the store's own `_id`.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::fingerprint::Fingerprint;

/// Payload fields of an envelope or stored value.
pub type Payload = Map<String, Value>;

/// Envelope field carrying the fingerprint.
pub const REQUEST_ID_FIELD: &str = "requestId";
/// Envelope field telling whether the payload came from the store.
pub const CACHED_FIELD: &str = "cached";
/// Store-internal identifier dropped when reading values back.
pub const STORE_ID_FIELD: &str = "_id";
/// Field holding a body that is not a JSON object.
pub const BODY_FIELD: &str = "body";

/// Turns an arbitrary JSON value into payload fields.
///
/// Objects are used as they are; any other value is kept under `body`.
pub fn into_payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        Value::Null => Payload::new(),
        other => {
            let mut payload = Payload::new();
            payload.insert(BODY_FIELD.to_owned(), other);
            payload
        }
    }
}

/// Turns a raw response body into payload fields.
///
/// JSON bodies go through [`into_payload`]; anything else is kept as text
/// under `body`. An empty body gives an empty payload.
pub fn payload_from_body(body: &[u8]) -> Payload {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Payload::new();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => into_payload(value),
        Err(_) => into_payload(Value::String(String::from_utf8_lossy(body).into_owned())),
    }
}

/// A value as persisted in the backing store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredValue(Payload);

impl StoredValue {
    /// Wraps payload fields, dropping any injected envelope fields.
    pub fn new(mut payload: Payload) -> Self {
        payload.remove(REQUEST_ID_FIELD);
        payload.remove(CACHED_FIELD);
        StoredValue(payload)
    }

    /// Builds a stored value from a body read back from the store.
    ///
    /// The store's own `_id` field is an implementation detail of the store
    /// and is dropped.
    pub fn from_store(value: Value) -> Self {
        let mut payload = into_payload(value);
        payload.remove(STORE_ID_FIELD);
        Self::new(payload)
    }

    /// Returns the payload fields.
    pub fn payload(&self) -> &Payload {
        &self.0
    }

    /// Consumes the value, returning the payload fields.
    pub fn into_payload(self) -> Payload {
        self.0
    }

    /// Returns the value as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Uniform result of a cached request.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    payload: Payload,
    request_id: Fingerprint,
    cached: bool,
}

impl Envelope {
    /// Creates an envelope for a value served from the store.
    pub fn from_store(request_id: Fingerprint, value: StoredValue) -> Self {
        Envelope {
            payload: value.into_payload(),
            request_id,
            cached: true,
        }
    }

    /// Creates an envelope for freshly fetched payload fields.
    pub fn fresh(request_id: Fingerprint, payload: Payload) -> Self {
        Envelope {
            payload: StoredValue::new(payload).into_payload(),
            request_id,
            cached: false,
        }
    }

    /// Returns the fingerprint of the request this envelope answers.
    pub fn request_id(&self) -> &Fingerprint {
        &self.request_id
    }

    /// Returns `true` if the payload came from the store.
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// Returns the payload fields.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns a single payload field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    /// Returns the value to persist: the payload without injected fields.
    pub fn to_stored(&self) -> StoredValue {
        StoredValue::new(self.payload.clone())
    }

    /// Consumes the envelope, returning the value to persist.
    pub fn into_stored(self) -> StoredValue {
        StoredValue::new(self.payload)
    }

    /// Consumes the envelope, returning its parts.
    pub fn into_parts(self) -> (Payload, Fingerprint, bool) {
        (self.payload, self.request_id, self.cached)
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.payload.len() + 2))?;
        for (key, value) in &self.payload {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(REQUEST_ID_FIELD, &self.request_id)?;
        map.serialize_entry(CACHED_FIELD, &self.cached)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EnvelopeVisitor)
    }
}

struct EnvelopeVisitor;

impl<'de> Visitor<'de> for EnvelopeVisitor {
    type Value = Envelope;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a `requestId` field")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Envelope, A::Error> {
        let mut payload = Payload::new();
        let mut request_id = None;
        let mut cached = false;

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                REQUEST_ID_FIELD => request_id = Some(access.next_value::<Fingerprint>()?),
                CACHED_FIELD => cached = access.next_value::<Option<bool>>()?.unwrap_or(false),
                _ => {
                    let value = access.next_value::<Value>()?;
                    payload.insert(key, value);
                }
            }
        }

        let request_id = request_id.ok_or_else(|| de::Error::missing_field(REQUEST_ID_FIELD))?;
        Ok(Envelope {
            payload,
            request_id,
            cached,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestDescriptor;
    use serde_json::json;

    fn id() -> Fingerprint {
        Fingerprint::of(&RequestDescriptor::get("http://x/"))
    }

    #[test]
    fn test_stored_value_drops_store_id() {
        let stored = StoredValue::from_store(json!({"_id": "abc", "foo": 1}));
        assert_eq!(stored.to_json(), json!({"foo": 1}));
    }

    #[test]
    fn test_into_stored_strips_injected_fields() {
        let mut payload = Payload::new();
        payload.insert("foo".to_owned(), json!(1));
        let envelope = Envelope::fresh(id(), payload);

        assert!(!envelope.is_cached());
        assert_eq!(envelope.into_stored().to_json(), json!({"foo": 1}));
    }

    #[test]
    fn test_fresh_payload_cannot_spoof_injected_fields() {
        let payload = into_payload(json!({"foo": 1, "cached": true, "requestId": "x"}));
        let envelope = Envelope::fresh(id(), payload);

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["cached"], json!(false));
        assert_eq!(value["requestId"], json!(id().as_str()));
    }

    #[test]
    fn test_envelope_serde_round_trip() {
        let raw = json!({"foo": 1, "requestId": id().as_str(), "cached": false});
        let envelope: Envelope = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(envelope.request_id(), &id());
        assert_eq!(envelope.get("foo"), Some(&json!(1)));
        assert_eq!(serde_json::to_value(&envelope).unwrap(), raw);
    }

    #[test]
    fn test_envelope_requires_request_id() {
        let result = serde_json::from_value::<Envelope>(json!({"foo": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn test_payload_from_body() {
        assert_eq!(payload_from_body(br#"{"foo":1}"#), into_payload(json!({"foo": 1})));
        assert_eq!(payload_from_body(b"[1,2]"), into_payload(json!({"body": [1, 2]})));
        assert_eq!(payload_from_body(b"plain text"), into_payload(json!({"body": "plain text"})));
        assert!(payload_from_body(b"").is_empty());
        assert!(payload_from_body(b"  \n").is_empty());
    }
}
