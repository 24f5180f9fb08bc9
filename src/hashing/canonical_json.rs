// src/hashing/canonical_json.rs
//! Canonical JSON form and its compact text encoding.
//!
//! Canonicalization sorts object keys in ascending code-point order at every
//! nesting level, preserves array element order, and passes scalars through
//! unchanged. The compact encoding (no whitespace, `,` and `:` separators)
//! of the canonical form is the exact byte sequence that gets hashed, so it
//! is a stable contract: any change to these rules invalidates every
//! previously issued digest.

use crate::hashing::error::DigestError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Nesting depth past which input is rejected instead of recursed into.
/// Credential data is nearly flat; anything this deep is malformed input
/// and would otherwise risk exhausting the stack.
const MAX_DEPTH: usize = 128;

/// Canonicalizes a JSON value: object keys sorted recursively, array order
/// preserved, scalars unchanged.
///
/// Numbers keep the exact representation they were parsed with (`3.90` is
/// not rewritten to `3.9`), and strings are never trimmed or re-encoded.
/// Idempotent: canonicalizing a canonical value yields an identical value.
///
/// # Errors
/// `DigestError::UnsupportedValue` if nesting exceeds the supported depth.
pub fn canonicalize(value: &Value) -> Result<Value, DigestError> {
    canonicalize_at(value, 0)
}

fn canonicalize_at(value: &Value, depth: usize) -> Result<Value, DigestError> {
    if depth > MAX_DEPTH {
        return Err(DigestError::UnsupportedValue(format!(
            "nesting exceeds {} levels",
            MAX_DEPTH
        )));
    }

    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(value.clone()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(canonicalize_at(item, depth + 1)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut sorted = BTreeMap::new();
            for (key, item) in map {
                sorted.insert(key.clone(), canonicalize_at(item, depth + 1)?);
            }
            Ok(Value::Object(sorted.into_iter().collect::<Map<_, _>>()))
        }
    }
}

/// Serializes a JSON value to its canonical text encoding:
/// - object keys in ascending code-point order
/// - separators `,` and `:` with no padding, no trailing newline
/// - JSON string escaping as emitted by `serde_json`
///
/// Sorting happens here as well, so the encoding of any value equals the
/// encoding of its canonical form.
pub fn to_canonical_json(value: &Value) -> Result<String, DigestError> {
    encode_at(value, 0)
}

fn encode_at(value: &Value, depth: usize) -> Result<String, DigestError> {
    if depth > MAX_DEPTH {
        return Err(DigestError::UnsupportedValue(format!(
            "nesting exceeds {} levels",
            MAX_DEPTH
        )));
    }

    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => serde_json::to_string(s).map_err(DigestError::from),
        Value::Array(items) => {
            let mut encoded = Vec::with_capacity(items.len());
            for item in items {
                encoded.push(encode_at(item, depth + 1)?);
            }
            Ok(format!("[{}]", encoded.join(",")))
        }
        Value::Object(map) => {
            let mut tree = BTreeMap::new();
            for (key, item) in map {
                tree.insert(key, encode_at(item, depth + 1)?);
            }
            let mut entries = Vec::with_capacity(tree.len());
            for (key, encoded) in tree {
                entries.push(format!(
                    "{}:{}",
                    serde_json::to_string(key).map_err(DigestError::from)?,
                    encoded
                ));
            }
            Ok(format!("{{{}}}", entries.join(",")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{canonicalize, to_canonical_json};
    use serde_json::{json, Value};

    #[test]
    fn test_primitives() {
        assert_eq!(to_canonical_json(&json!(null)).unwrap(), "null");
        assert_eq!(to_canonical_json(&json!(true)).unwrap(), "true");
        assert_eq!(to_canonical_json(&json!(123)).unwrap(), "123");
        assert_eq!(to_canonical_json(&json!("degree")).unwrap(), "\"degree\"");
    }

    #[test]
    fn test_array_order_preserved() {
        let val = json!([3, "a", false]);
        assert_eq!(to_canonical_json(&val).unwrap(), "[3,\"a\",false]");
    }

    #[test]
    fn test_object_sorted_keys() {
        let val = json!({ "b": 2, "a": 1 });
        assert_eq!(to_canonical_json(&val).unwrap(), "{\"a\":1,\"b\":2}");
    }

    #[test]
    fn test_nested_sorting_at_every_depth() {
        let val = json!({ "z": [ { "y": "yes" }, null ], "a": { "x": 10 } });
        assert_eq!(
            to_canonical_json(&val).unwrap(),
            "{\"a\":{\"x\":10},\"z\":[{\"y\":\"yes\"},null]}"
        );
    }

    #[test]
    fn test_key_order_of_input_is_irrelevant() {
        let forward: Value = serde_json::from_str(r#"{"x":{"b":1,"a":2}}"#).unwrap();
        let reversed: Value = serde_json::from_str(r#"{"x":{"a":2,"b":1}}"#).unwrap();
        assert_eq!(
            to_canonical_json(&forward).unwrap(),
            to_canonical_json(&reversed).unwrap()
        );
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let val = json!({
            "student_name": "Alex Chen",
            "scores": [{"b": 2, "a": 1}, null, "x"],
            "gpa": "3.9",
        });
        let once = canonicalize(&val).unwrap();
        let twice = canonicalize(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(
            to_canonical_json(&once).unwrap(),
            to_canonical_json(&val).unwrap()
        );
    }

    #[test]
    fn test_number_representation_is_preserved() {
        // arbitrary_precision keeps the source text of numbers intact.
        let long: Value = serde_json::from_str(r#"{"gpa":3.90}"#).unwrap();
        let short: Value = serde_json::from_str(r#"{"gpa":3.9}"#).unwrap();
        assert_eq!(to_canonical_json(&long).unwrap(), "{\"gpa\":3.90}");
        assert_eq!(to_canonical_json(&short).unwrap(), "{\"gpa\":3.9}");
    }

    #[test]
    fn test_string_escaping_matches_serde() {
        let val = json!({"name": "O\"Brien\n"});
        assert_eq!(
            to_canonical_json(&val).unwrap(),
            "{\"name\":\"O\\\"Brien\\n\"}"
        );
    }

    #[test]
    fn test_excessive_nesting_fails_fast() {
        let mut val = json!(1);
        for _ in 0..200 {
            val = json!([val]);
        }
        assert!(canonicalize(&val).is_err());
        assert!(to_canonical_json(&val).is_err());
    }
}
