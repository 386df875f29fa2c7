//! Stable value encoding.
//!
//! Record values are persisted as CBOR. Object members are written and read
//! back in their original order, so a value round-trips structurally
//! identical, key order included.

use crate::error::CoreError;
use crate::Value;

/// Encode a value to its persisted byte form.
pub fn encode_value(value: &Value) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
    Ok(buf)
}

/// Decode a value previously produced by [`encode_value`].
pub fn decode_value(bytes: &[u8]) -> Result<Value, CoreError> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn roundtrip(value: &Value) -> Value {
        decode_value(&encode_value(value).unwrap()).unwrap()
    }

    #[test]
    fn test_scalars_roundtrip() {
        for value in [
            json!(null),
            json!(true),
            json!(1),
            json!(-7),
            json!(u64::MAX),
            json!(1.5),
            json!("text"),
        ] {
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn test_object_key_order_preserved() {
        let value = json!({"zeta": 1, "alpha": {"y": [1, 2], "b": null}, "mid": "x"});
        let back = roundtrip(&value);

        let keys: Vec<&String> = back.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        let inner: Vec<&String> = back["alpha"].as_object().unwrap().keys().collect();
        assert_eq!(inner, ["y", "b"]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_value(&[0xff, 0x00, 0x13]).is_err());
        assert!(decode_value(&[]).is_err());
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9 ]{0,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..4).prop_map(|pairs| {
                    Value::Object(pairs.into_iter().collect())
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_value_roundtrips(value in arb_json()) {
            prop_assert_eq!(roundtrip(&value), value);
        }
    }
}
