//! Error types for Depot Core.

use thiserror::Error;

/// Core errors from encoding, decoding and parsing.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

/// Errors raised when a write payload is malformed.
///
/// These are always raised before any storage mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("key must not be empty")]
    EmptyKey,

    #[error("key is {len} bytes, maximum is {max}")]
    KeyTooLong { len: usize, max: usize },

    #[error("encoded value is {len} bytes, maximum is {max}")]
    ValueTooLarge { len: usize, max: usize },

    #[error("attachment is {len} bytes, maximum is {max}")]
    AttachmentTooLarge { len: usize, max: usize },

    #[error("value cannot be encoded: {0}")]
    UnencodableValue(String),
}
