//! Key-order independent JSON for cache keys and fingerprints.
//!
//! Object keys are sorted at every level; array order is kept because it is
//! meaningful (sort keys, `in` lists). The canonical text is compact.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Rebuilds `value` with every object's keys in ascending order.
#[must_use]
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (k, v) in entries {
                sorted.insert(k, canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// # Errors
///
/// Fails only if `value` cannot be represented as JSON (e.g. a map with
/// non-string keys).
pub fn create_canonical_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let value = serde_json::to_value(value)?;
    serde_json::to_string(&canonicalize(value))
}

/// Canonical JSON, base64url without padding. Safe in identifiers and paths.
///
/// # Errors
///
/// See [`create_canonical_json`].
pub fn serialize_to_base64<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    create_canonical_json(value).map(|json| URL_SAFE_NO_PAD.encode(json))
}

/// `"{prefix}:{base64}"`.
///
/// # Errors
///
/// See [`create_canonical_json`].
pub fn cache_key<T: Serialize + ?Sized>(prefix: &str, value: &T) -> serde_json::Result<String> {
    serialize_to_base64(value).map(|encoded| format!("{prefix}:{encoded}"))
}

/// Hex SHA-256 of the canonical JSON. Fixed length regardless of input size.
///
/// # Errors
///
/// See [`create_canonical_json`].
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let json = create_canonical_json(value)?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_matter_at_any_depth() {
        let a: Value = serde_json::from_str(
            r#"{"b":1,"a":{"y":[{"q":null,"p":2}],"x":{}},"c":null}"#,
        )
        .unwrap();
        let b: Value = serde_json::from_str(
            r#"{"c":null,"a":{"x":{},"y":[{"p":2,"q":null}]},"b":1}"#,
        )
        .unwrap();
        let ca = create_canonical_json(&a).unwrap();
        assert_eq!(ca, create_canonical_json(&b).unwrap());
        assert_eq!(ca, r#"{"a":{"x":{},"y":[{"p":2,"q":null}]},"b":1,"c":null}"#);
    }

    #[test]
    fn array_order_is_preserved() {
        assert_ne!(
            create_canonical_json(&json!([1, 2])).unwrap(),
            create_canonical_json(&json!([2, 1])).unwrap()
        );
    }

    #[test]
    fn empty_object_is_braces() {
        assert_eq!(create_canonical_json(&json!({})).unwrap(), "{}");
    }

    #[test]
    fn base64_output_is_url_safe() {
        // These encode to '+' and '/' in the standard alphabet.
        let inputs = [
            json!({"filter": "???>>>~~~"}),
            json!({"k": "\u{00ff}\u{00fe}\u{00fb}"}),
            json!({"a": 1}),
            json!([]),
        ];
        for input in inputs {
            let encoded = serialize_to_base64(&input).unwrap();
            assert!(
                !encoded.contains(['+', '/', '=']),
                "{encoded} is not url safe"
            );
        }
    }

    #[test]
    fn base64_decodes_back_to_canonical_json() {
        let value = json!({"z": true, "a": [3, {"n": "x"}]});
        let encoded = serialize_to_base64(&value).unwrap();
        let decoded = URL_SAFE_NO_PAD.decode(encoded).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            create_canonical_json(&value).unwrap()
        );
    }

    #[test]
    fn cache_key_and_fingerprint_are_stable() {
        let a = json!({"page": 1, "limit": 10});
        let b = json!({"limit": 10, "page": 1});
        assert_eq!(cache_key("courses", &a).unwrap(), cache_key("courses", &b).unwrap());
        assert!(cache_key("courses", &a).unwrap().starts_with("courses:"));
        let fp = fingerprint(&a).unwrap();
        assert_eq!(fp.len(), 64);
        assert_eq!(fp, fingerprint(&b).unwrap());
    }
}
