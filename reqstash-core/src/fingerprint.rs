//! Request fingerprinting.
//!
//! A [`Fingerprint`] identifies a request in the backing store. It is the
//! lowercase hex SHA-1 digest of the descriptor's canonical form:
//!
//! 1. The descriptor is copied into a JSON object; the caller's value is
//!    never touched.
//! 2. A missing (or empty) `method` becomes `"GET"`.
//! 3. `baseUrl` and `url` are concatenated verbatim into `url`, and
//!    `baseUrl` is dropped. With only a base, the base becomes `url`.
//! 4. Object keys are sorted at every nesting level and the result is
//!    encoded as compact JSON.
//! 5. The bytes are hashed with SHA-1.
//!
//! Key sorting does not rely on the map type backing [`serde_json::Map`], so
//! the digest is stable whether or not `preserve_order` is enabled.
//!
//! ```
//! use reqstash_core::{Fingerprint, RequestDescriptor};
//!
//! let split = RequestDescriptor::new().base_url("http://x/").url("a");
//! let joined = RequestDescriptor::new().base_url("http://x/a");
//! assert_eq!(Fingerprint::of(&split), Fingerprint::of(&joined));
//!
//! let id = Fingerprint::of(&split);
//! assert_eq!(id.as_str().len(), 40);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use sha1::{Digest, Sha1};

use crate::descriptor::{DEFAULT_METHOD, RequestDescriptor};

const FINGERPRINT_LEN: usize = 40;

/// Stable identifier of a request, used as the store key.
///
/// Cloning is cheap: the hex string is shared behind an [`Arc`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Arc<str>);

impl Fingerprint {
    /// Computes the fingerprint of a descriptor.
    pub fn of(descriptor: &RequestDescriptor) -> Self {
        let canonical = canonical_form(descriptor);
        let digest = Sha1::digest(canonical.to_string().as_bytes());
        Fingerprint(hex::encode(digest).into())
    }

    /// Returns the hex representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Builds the canonical JSON object hashed by [`Fingerprint::of`].
pub fn canonical_form(descriptor: &RequestDescriptor) -> Value {
    let mut object: Map<String, Value> = descriptor
        .extra()
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let method = descriptor.method_str().unwrap_or(DEFAULT_METHOD);
    object.insert("method".to_owned(), Value::String(method.to_owned()));

    if let Some(location) = descriptor.location() {
        object.insert("url".to_owned(), Value::String(location));
    }

    sort_keys(Value::Object(object))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when parsing a string that is not a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fingerprint {0:?}: expected 40 lowercase hex characters")]
pub struct InvalidFingerprint(pub String);

impl FromStr for Fingerprint {
    type Err = InvalidFingerprint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == FINGERPRINT_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Fingerprint(s.into()))
        } else {
            Err(InvalidFingerprint(s.to_owned()))
        }
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_form_rewrites_location_and_method() {
        let descriptor = RequestDescriptor::new().base_url("http://x/").url("a");
        assert_eq!(
            canonical_form(&descriptor),
            json!({"method": "GET", "url": "http://x/a"})
        );
    }

    #[test]
    fn test_no_slash_normalization() {
        let concatenated = RequestDescriptor::new().base_url("http://x").url("a");
        let literal = RequestDescriptor::new().url("http://xa");
        let slashed = RequestDescriptor::new().url("http://x/a");

        assert_eq!(Fingerprint::of(&concatenated), Fingerprint::of(&literal));
        assert_ne!(Fingerprint::of(&concatenated), Fingerprint::of(&slashed));
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let a: RequestDescriptor = serde_json::from_str(
            r#"{"url":"a","baseUrl":"http://x/","qs":{"b":2,"a":1},"headers":{"y":"1","x":"2"}}"#,
        )
        .unwrap();
        let b: RequestDescriptor = serde_json::from_str(
            r#"{"headers":{"x":"2","y":"1"},"qs":{"a":1,"b":2},"baseUrl":"http://x/","url":"a"}"#,
        )
        .unwrap();

        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn test_explicit_get_matches_default() {
        let implicit = RequestDescriptor::new().base_url("http://x/");
        let explicit = RequestDescriptor::get("http://x/");
        assert_eq!(Fingerprint::of(&implicit), Fingerprint::of(&explicit));
    }

    #[test]
    fn test_extra_fields_change_fingerprint() {
        let plain = RequestDescriptor::get("http://x/");
        let with_query = RequestDescriptor::get("http://x/").query("page", 2);
        let with_method = RequestDescriptor::post("http://x/");

        assert_ne!(Fingerprint::of(&plain), Fingerprint::of(&with_query));
        assert_ne!(Fingerprint::of(&plain), Fingerprint::of(&with_method));
    }

    #[test]
    fn test_digest_of_known_canonical_form() {
        // sha1('{"method":"GET","url":"http://x/a"}')
        let descriptor = RequestDescriptor::new().url("http://x/a");
        let expected = hex::encode(Sha1::digest(br#"{"method":"GET","url":"http://x/a"}"#));
        assert_eq!(Fingerprint::of(&descriptor).as_str(), expected);
    }

    #[test]
    fn test_caller_descriptor_is_untouched() {
        let descriptor = RequestDescriptor::new().base_url("http://x/").url("a");
        let before = descriptor.clone();
        let _ = Fingerprint::of(&descriptor);
        assert_eq!(descriptor, before);
    }

    #[test]
    fn test_parse_and_serde() {
        let id = Fingerprint::of(&RequestDescriptor::get("http://x/"));
        let parsed: Fingerprint = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);

        assert!("not-a-fingerprint".parse::<Fingerprint>().is_err());
        assert!("A".repeat(40).parse::<Fingerprint>().is_err());

        let encoded = serde_json::to_value(&id).unwrap();
        assert_eq!(encoded, Value::String(id.to_string()));
        let decoded: Fingerprint = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, id);
    }
}
