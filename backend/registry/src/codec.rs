//! Reversible numeric codec for the "sealed" project fields.
//!
//! A value is rendered as decimal text, base64-encoded and tagged with
//! [`PREFIX`]. This hides figures from a casual glance at the raw store and
//! nothing more: anyone holding an [`OpaqueValue`] can decode it without a
//! key. The reveal flow in [`crate::reveal`] puts a signature prompt in front
//! of [`decode`], but the value itself is never protected.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Tag marking a codec-produced string.
pub const PREFIX: &str = "FHE-";

/// A codec-encoded number as it is stored and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueValue(String);

impl OpaqueValue {
    /// Wrap a string read from storage. No validation is done; legacy
    /// unprefixed values are accepted and decoded leniently.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> f64 {
        decode(&self.0)
    }
}

impl fmt::Display for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<OpaqueValue> for String {
    fn from(value: OpaqueValue) -> Self {
        value.0
    }
}

/// Encode `value` as `"FHE-" + base64(decimal text)`.
///
/// Integral values are written without a fractional part (`1500`, not
/// `1500.0`).
pub fn encode(value: f64) -> OpaqueValue {
    OpaqueValue(format!("{PREFIX}{}", STANDARD.encode(value.to_string())))
}

/// Decode a codec string back into a number.
///
/// Prefixed input is unwrapped and parsed; anything else is parsed as a plain
/// number. Input that is not a number either way yields `NaN`.
///
/// Parsing is strict over the whole (trimmed) text: `"12abc"` is `NaN`, not
/// `12` as a prefix-reading `parseFloat` would give.
pub fn decode(raw: &str) -> f64 {
    let text = match raw.strip_prefix(PREFIX) {
        Some(payload) => match STANDARD
            .decode(payload)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
        {
            Some(text) => text,
            None => return f64::NAN,
        },
        None => raw.to_string(),
    };
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uses_prefix_and_base64() {
        // base64("1500") == "MTUwMA=="
        assert_eq!(encode(1500.0).as_str(), "FHE-MTUwMA==");
    }

    #[test]
    fn round_trip_preserves_value() {
        for v in [0.0, 1.0, 42.0, 1500.0, -7.25, 0.1, 123456789.5, 1e-7] {
            assert_eq!(decode(encode(v).as_str()), v, "value {v}");
        }
    }

    #[test]
    fn decode_unprefixed_parses_directly() {
        assert_eq!(decode("250"), 250.0);
        assert_eq!(decode("3.5"), 3.5);
    }

    #[test]
    fn decode_non_numeric_is_nan() {
        assert!(decode("not a number").is_nan());
        assert!(decode("").is_nan());
        assert!(decode("12abc").is_nan());
    }

    #[test]
    fn decode_prefixed_garbage_is_nan() {
        assert!(decode("FHE-!!!").is_nan());
        // base64("abc") is valid base64 but not a number.
        assert!(decode("FHE-YWJj").is_nan());
    }

    #[test]
    fn opaque_value_serializes_as_plain_string() {
        let v = encode(12.0);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, format!("\"{}\"", v.as_str()));
        let back: OpaqueValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
