//! Binary payload normalization.
//!
//! The payload column has been written through more than one code path
//! over the store's lifetime, so a value read back may be canonical
//! bytes, a driver-tagged `{"type":"Buffer","data":[...]}` structure,
//! a bare array of byte values, or a string that is either base64 or
//! plain UTF-8 text. This module isolates every read path from that
//! history: callers classify the stored value into a [`PayloadRepr`]
//! and normalize it to one canonical byte sequence. Classification is
//! canonical-first: a stored value that is a well-formed JSON document
//! is served back byte-identical unless it provably carries a legacy
//! encoding, so current-path uploads always round-trip.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

/// A stored payload value in one of its historical representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadRepr {
    /// Already a canonical byte sequence.
    Buffer(Vec<u8>),
    /// `{"type":"Buffer","data":[...]}` with the array reinterpreted as bytes.
    TaggedBuffer(Vec<u8>),
    /// Bare JSON array of byte values.
    IntArray(Vec<u8>),
    /// A string, plausibly base64 or plausibly UTF-8 text.
    Text(String),
}

/// The stored value matched none of the historical payload shapes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognized payload encoding: {0}")]
pub struct PayloadError(pub String);

impl PayloadRepr {
    /// Classify a driver-side JSON value. Total case analysis: every
    /// JSON shape either maps to a known representation or fails.
    pub fn from_value(value: &Value) -> Result<PayloadRepr, PayloadError> {
        match value {
            Value::Object(map) => match (map.get("type").and_then(Value::as_str), map.get("data")) {
                (Some("Buffer"), Some(Value::Array(items))) => {
                    Ok(PayloadRepr::TaggedBuffer(bytes_from_array(items)?))
                }
                _ => Err(PayloadError(
                    "object is not a tagged Buffer structure".into(),
                )),
            },
            Value::Array(items) => Ok(PayloadRepr::IntArray(bytes_from_array(items)?)),
            Value::String(s) => Ok(PayloadRepr::Text(s.clone())),
            Value::Null => Err(PayloadError("null payload".into())),
            Value::Bool(_) => Err(PayloadError("boolean payload".into())),
            Value::Number(_) => Err(PayloadError("numeric payload".into())),
        }
    }

    /// Classify a raw column read, canonical-first.
    ///
    /// A raw value that is a well-formed JSON document may itself be a
    /// canonically stored upload, even when its shape matches a legacy
    /// encoding, so a JSON read is only reinterpreted as legacy when
    /// the reinterpretation decodes to a well-formed JSON document
    /// (every legacy array and tagged-buffer row encodes the bytes of
    /// one). An uploaded document that is an array of byte values whose
    /// bytes happen to spell out valid JSON remains ambiguous; the
    /// legacy reading wins there. The legacy string path stored its
    /// base64 or plain text unquoted, which never parses as JSON, so
    /// JSON strings are always canonical.
    pub fn from_stored(raw: &[u8]) -> Result<PayloadRepr, PayloadError> {
        if let Ok(value) = serde_json::from_slice::<Value>(raw) {
            let legacy = match &value {
                Value::Object(map)
                    if map.get("type").and_then(Value::as_str) == Some("Buffer") =>
                {
                    match map.get("data") {
                        Some(Value::Array(items)) if items.iter().all(is_byte_value) => {
                            Some(PayloadRepr::TaggedBuffer(bytes_from_array(items)?))
                        }
                        _ => None,
                    }
                }
                Value::Array(items) if items.iter().all(is_byte_value) => {
                    Some(PayloadRepr::IntArray(bytes_from_array(items)?))
                }
                _ => None,
            };

            if let Some(repr) = legacy {
                let decodes_to_document = match &repr {
                    PayloadRepr::TaggedBuffer(bytes) | PayloadRepr::IntArray(bytes) => {
                        serde_json::from_slice::<Value>(bytes).is_ok()
                    }
                    _ => false,
                };
                if decodes_to_document {
                    return Ok(repr);
                }
            }

            return Ok(PayloadRepr::Buffer(raw.to_vec()));
        }

        match std::str::from_utf8(raw) {
            Ok(text) => Ok(PayloadRepr::Text(text.to_string())),
            Err(_) => Ok(PayloadRepr::Buffer(raw.to_vec())),
        }
    }

    /// Produce the canonical byte sequence. First match wins:
    /// buffers and byte arrays pass through, strings try base64 and
    /// fall back to their UTF-8 bytes when decoding is not meaningful.
    pub fn normalize(self) -> Vec<u8> {
        match self {
            PayloadRepr::Buffer(bytes)
            | PayloadRepr::TaggedBuffer(bytes)
            | PayloadRepr::IntArray(bytes) => bytes,
            PayloadRepr::Text(s) => match BASE64.decode(s.as_bytes()) {
                Ok(decoded) if !decoded.is_empty() => decoded,
                _ => s.into_bytes(),
            },
        }
    }
}

/// Normalize a raw column read into canonical payload bytes.
pub fn normalize_stored(raw: &[u8]) -> Result<Vec<u8>, PayloadError> {
    Ok(PayloadRepr::from_stored(raw)?.normalize())
}

fn is_byte_value(value: &Value) -> bool {
    value.as_u64().is_some_and(|n| n <= u8::MAX as u64)
}

fn bytes_from_array(items: &[Value]) -> Result<Vec<u8>, PayloadError> {
    items
        .iter()
        .map(|v| {
            v.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| PayloadError(format!("non-byte array element {v}")))
        })
        .collect()
}
