//! Write payload validation.
//!
//! Every check here runs before a store is touched, so a rejected write
//! leaves no trace.

use serde::{Deserialize, Serialize};

use crate::codec::encode_value;
use crate::error::ValidationError;
use crate::types::Key;
use crate::Value;

/// Size limits applied to writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum key length in bytes.
    pub max_key_bytes: usize,
    /// Maximum encoded value size in bytes.
    pub max_value_bytes: usize,
    /// Maximum attachment size in bytes.
    pub max_attachment_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_key_bytes: 1024,
            max_value_bytes: 1024 * 1024,           // 1 MiB
            max_attachment_bytes: 16 * 1024 * 1024, // 16 MiB
        }
    }
}

/// Validate and wrap a key.
pub fn validate_key(key: &str, limits: &Limits) -> Result<Key, ValidationError> {
    if key.len() > limits.max_key_bytes {
        return Err(ValidationError::KeyTooLong {
            len: key.len(),
            max: limits.max_key_bytes,
        });
    }
    Key::new(key)
}

/// Check that a value is encodable and within the size limit.
///
/// Returns the encoded bytes so the caller can store them without encoding
/// twice.
pub fn validate_value(value: &Value, limits: &Limits) -> Result<Vec<u8>, ValidationError> {
    let encoded =
        encode_value(value).map_err(|e| ValidationError::UnencodableValue(e.to_string()))?;
    let len = encoded.len();
    if len > limits.max_value_bytes {
        return Err(ValidationError::ValueTooLarge {
            len,
            max: limits.max_value_bytes,
        });
    }
    Ok(encoded)
}

pub fn validate_attachment(bytes: &[u8], limits: &Limits) -> Result<(), ValidationError> {
    if bytes.len() > limits.max_attachment_bytes {
        return Err(ValidationError::AttachmentTooLarge {
            len: bytes.len(),
            max: limits.max_attachment_bytes,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tiny() -> Limits {
        Limits {
            max_key_bytes: 4,
            max_value_bytes: 8,
            max_attachment_bytes: 3,
        }
    }

    #[test]
    fn test_key_limits() {
        assert_eq!(validate_key("", &tiny()), Err(ValidationError::EmptyKey));
        assert_eq!(
            validate_key("toolong", &tiny()),
            Err(ValidationError::KeyTooLong { len: 7, max: 4 })
        );
        assert_eq!(validate_key("ok", &tiny()).unwrap().as_str(), "ok");
    }

    #[test]
    fn test_value_limit() {
        let encoded = validate_value(&json!(1), &tiny()).unwrap();
        assert_eq!(crate::decode_value(&encoded).unwrap(), json!(1));
        assert!(matches!(
            validate_value(&json!("a long string value"), &tiny()),
            Err(ValidationError::ValueTooLarge { max: 8, .. })
        ));
    }

    #[test]
    fn test_attachment_limit() {
        assert!(validate_attachment(b"ABC", &tiny()).is_ok());
        assert_eq!(
            validate_attachment(b"ABCD", &tiny()),
            Err(ValidationError::AttachmentTooLarge { len: 4, max: 3 })
        );
    }

    #[test]
    fn test_limits_deserialize_with_defaults() {
        let limits: Limits = serde_json::from_str(r#"{"max_key_bytes": 16}"#).unwrap();
        assert_eq!(limits.max_key_bytes, 16);
        assert_eq!(limits.max_value_bytes, Limits::default().max_value_bytes);
    }
}
