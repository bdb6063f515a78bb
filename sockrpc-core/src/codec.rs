//! Codec layer for message and envelope serialization
//!
//! The codec turns typed messages and response envelopes into bytes and back.
//! Two wire formats are supported:
//!
//! - **Binary** (default): compact bincode encoding
//! - **Json**: serde_json encoding, handy for debugging and for clients that
//!   cannot speak the binary format
//!
//! Both sides of a connection must agree on the codec; nothing in the bytes
//! identifies which one produced them.
//!
//! # Error Handling
//!
//! Codec functions return `CodecError`, keeping the codec's own message. The
//! response encoder normalizes these into `Error::Protocol` before they reach
//! the transport layer.
//!
//! # Examples
//!
//! ```rust
//! use sockrpc_core::Codec;
//!
//! let bytes = Codec::Json.encode(&vec![1u32, 2, 3]).unwrap();
//! assert_eq!(bytes, b"[1,2,3]");
//!
//! let decoded: Vec<u32> = Codec::Json.decode(&bytes).unwrap();
//! assert_eq!(decoded, vec![1, 2, 3]);
//! ```

use crate::error::CodecError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire format used to serialize messages and envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// bincode
    #[default]
    Binary,
    /// serde_json
    Json,
}

impl Codec {
    /// Encode any serializable value to bytes
    ///
    /// # Errors
    ///
    /// Returns the codec's own failure (e.g. a `Serialize` impl that errors,
    /// or a map with non-string keys under JSON).
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            Codec::Binary => Ok(bincode::serialize(value)?),
            Codec::Json => Ok(serde_json::to_vec(value)?),
        }
    }

    /// Decode bytes produced by `encode` with the same codec
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        match self {
            Codec::Binary => Ok(bincode::deserialize(bytes)?),
            Codec::Json => Ok(serde_json::from_slice(bytes)?),
        }
    }

    /// Name used in configuration and logs
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Binary => "binary",
            Codec::Json => "json",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = String;

    /// Parses "binary" (alias "bincode") or "json", case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bincode" => Ok(Codec::Binary),
            "json" => Ok(Codec::Json),
            other => Err(format!("unknown codec: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to encode"))
        }
    }

    #[test]
    fn test_binary_is_default() {
        assert_eq!(Codec::default(), Codec::Binary);
    }

    #[test]
    fn test_binary_encode_decode() {
        let point = Point { x: 3, y: -4 };
        let bytes = Codec::Binary.encode(&point).unwrap();
        let decoded: Point = Codec::Binary.decode(&bytes).unwrap();

        assert_eq!(decoded, point);
    }

    #[test]
    fn test_json_output_is_readable() {
        let bytes = Codec::Json.encode(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"x":1,"y":2}"#);
    }

    #[test]
    fn test_serialize_failure_is_reported() {
        for codec in [Codec::Binary, Codec::Json] {
            let err = codec.encode(&Unencodable).unwrap_err();
            assert!(err.to_string().contains("refusing to encode"), "{codec}");
        }
    }

    #[test]
    fn test_json_rejects_non_string_keys() {
        let mut map = HashMap::new();
        map.insert((1, 2), "pair");

        let err = Codec::Json.encode(&map).unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }

    #[test]
    fn test_decode_truncated_binary() {
        let bytes = Codec::Binary.encode(&Point { x: 1, y: 2 }).unwrap();
        let err = Codec::Binary.decode::<Point>(&bytes[..3]).unwrap_err();

        assert!(matches!(err, CodecError::Binary(_)));
    }

    #[test]
    fn test_codec_from_str() {
        assert_eq!("binary".parse::<Codec>().unwrap(), Codec::Binary);
        assert_eq!("BINCODE".parse::<Codec>().unwrap(), Codec::Binary);
        assert_eq!(" json ".parse::<Codec>().unwrap(), Codec::Json);
        assert!("protobuf".parse::<Codec>().is_err());
    }

    #[test]
    fn test_codec_display() {
        assert_eq!(Codec::Binary.to_string(), "binary");
        assert_eq!(Codec::Json.to_string(), "json");
    }
}
