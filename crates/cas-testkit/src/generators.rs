//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Number, Value};

use cas_core::{Pointer, POINTER_LEN};

/// Generate a random pointer.
pub fn pointer() -> impl Strategy<Value = Pointer> {
    any::<[u8; POINTER_LEN]>().prop_map(Pointer::from_bytes)
}

/// Generate a lookup key that is too long to be a pointer.
pub fn oversized_pointer() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), POINTER_LEN + 1..=64)
}

/// Generate arbitrary blob bytes of specified max length.
pub fn blob(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate an object key, including non-ASCII and escape-worthy characters.
pub fn json_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_]{0,7}",
        "[A-Za-z<>&\"\\\\ ]{1,4}",
        "[\\u{e9}\\u{4e2d}\\u{1f600}\\u{2028}]{1,3}",
    ]
}

/// Generate a JSON scalar.
pub fn json_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| Value::Number(n.into())),
        (-1.0e9f64..1.0e9f64)
            .prop_filter_map("finite", Number::from_f64)
            .prop_map(Value::Number),
        "[ -~]{0,12}".prop_map(Value::String),
    ]
}

/// Generate a JSON document up to a few levels deep.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((json_key(), inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Render a document two ways: compact, and pretty-printed.
///
/// Both texts describe the same document and must share one pointer.
pub fn json_renderings() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    json_value().prop_filter_map("serializable", |value| {
        let compact = serde_json::to_vec(&value).ok()?;
        let pretty = serde_json::to_vec_pretty(&value).ok()?;
        Some((compact, pretty))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use cas_core::{canonicalize, digest, is_structured};

    proptest! {
        #[test]
        fn rendering_does_not_change_pointer((compact, pretty) in json_renderings()) {
            let a = canonicalize(Bytes::from(compact));
            let b = canonicalize(Bytes::from(pretty));
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(digest(&a), digest(&b));
        }

        #[test]
        fn generated_documents_are_structured((compact, _) in json_renderings()) {
            prop_assert!(is_structured(&compact));
        }

        #[test]
        fn oversized_pointers_are_oversized(key in oversized_pointer()) {
            prop_assert!(!cas_core::is_valid_lookup_len(key.len()));
        }
    }
}
