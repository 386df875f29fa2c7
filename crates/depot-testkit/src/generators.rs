//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// A valid key: non-empty, printable, possibly with `/` and unicode.
pub fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./\\-é]{1,24}"
}

/// An arbitrary JSON value. Floats are kept finite since JSON cannot carry
/// NaN or infinities.
pub fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(Value::from),
        "\\PC{0,16}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::from),
            prop::collection::vec(("[a-z]{1,8}", inner), 0..5).prop_map(|pairs| {
                Value::Object(pairs.into_iter().collect::<Map<_, _>>())
            }),
        ]
    })
}

/// Attachment bytes, including the empty attachment.
pub fn attachment() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// A write: key index into a small key set, value, optional attachment, and
/// a clock step (possibly backwards) taken before it.
pub type WriteOp = (usize, Value, Option<Vec<u8>>, i64);

pub fn write_ops(keys: usize) -> impl Strategy<Value = Vec<WriteOp>> {
    prop::collection::vec(
        (
            0..keys,
            json_value(),
            prop::option::of(attachment()),
            -10i64..10,
        ),
        1..24,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn keys_are_non_empty(k in key()) {
            prop_assert!(!k.is_empty());
        }

        #[test]
        fn values_serialize(v in json_value()) {
            let text = serde_json::to_string(&v).unwrap();
            let back: Value = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(back.is_object(), v.is_object());
        }
    }
}
