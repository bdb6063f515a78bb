//! Error types for sockrpc
//!
//! This module provides the error taxonomy for the response side of an RPC
//! call. It defines two families of errors:
//!
//! - **Error**: Failures raised by the response pipeline itself (uses thiserror)
//! - **CodecError**: Failures raised by the codec layer while turning values
//!   into bytes or back
//!
//! # Failure Containment
//!
//! Codec errors are an open-ended set (every codec has its own failure modes).
//! The response encoder never lets them through: any failure during encoding
//! is collapsed into `Error::Protocol`, carrying the original message. The
//! only other failure the encoder produces on its own is
//! `Error::BadResponseType`.
//!
//! Application-level error values (`RpcError`) are *not* failures of this
//! pipeline. They are a normal response shape that gets wrapped into the
//! error form of the envelope.
//!
//! # Examples
//!
//! ```rust
//! use sockrpc_core::{Error, ErrorReason};
//!
//! let error = Error::BadResponseType {
//!     expected: "Greeting".into(),
//!     actual: "Farewell".into(),
//! };
//! assert_eq!(
//!     error.to_string(),
//!     "Expected response to be of type Greeting but was Farewell"
//! );
//! assert_eq!(error.to_rpc_error().reason, ErrorReason::BadResponseProto);
//! ```

use crate::types::RpcError;
use thiserror::Error;

/// Result type for sockrpc operations
///
/// Convenience alias used throughout the sockrpc crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by the response pipeline
///
/// # Error Categories
///
/// - **Contract errors**: BadResponseType, Construct
/// - **Encoding errors**: Protocol (normalized), Codec (raw, client side only)
/// - **Wiring errors**: MissingContext
/// - **Remote errors**: Rpc (an error envelope decoded on the client side)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The handler produced a value whose runtime type is not the call's
    /// declared response type
    ///
    /// Never coerced silently: the client decodes the response bytes with
    /// the declared type, so a mismatch would corrupt its decoding.
    #[error("Expected response to be of type {expected} but was {actual}")]
    BadResponseType {
        /// Schema name the call declared
        expected: String,
        /// Schema or type name the handler actually produced
        actual: String,
    },

    /// Any failure that happened while serializing the response
    ///
    /// Holds the message of the original codec failure. This is the only
    /// failure kind the encoding step ever reports.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A plain key/value structure could not be turned into the expected type
    #[error("Cannot construct {expected} from response structure: {message}")]
    Construct {
        /// Schema name the call declared
        expected: String,
        /// Why the structure was rejected
        message: String,
    },

    /// The call context is missing a field the encoder needs
    #[error("Call context is missing {0}")]
    MissingContext(&'static str),

    /// Codec failure outside the response encoder (e.g. client-side decoding)
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// The remote side answered with an error envelope
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}

impl Error {
    /// Map this failure to the error value a server can still put on the wire
    ///
    /// The surrounding request layer uses this when the encoder fails and it
    /// decides to send a minimal error envelope instead of dropping the call.
    pub fn to_rpc_error(&self) -> RpcError {
        match self {
            Error::BadResponseType { .. } | Error::Construct { .. } => {
                RpcError::bad_response_proto(self.to_string())
            }
            Error::Protocol(_) | Error::Codec(_) => RpcError::rpc_error(self.to_string()),
            Error::MissingContext(_) => RpcError::rpc_failed(self.to_string()),
            Error::Rpc(err) => err.clone(),
        }
    }

    /// Short, stable name of the error kind, used as a metric attribute
    pub fn kind(&self) -> &'static str {
        match self {
            Error::BadResponseType { .. } => "bad_response_type",
            Error::Protocol(_) => "protocol",
            Error::Construct { .. } => "construct",
            Error::MissingContext(_) => "missing_context",
            Error::Codec(_) => "codec",
            Error::Rpc(_) => "rpc",
        }
    }
}

/// Failures raised by the codec layer
///
/// Each variant keeps the codec's own message as a string so the error stays
/// `Clone` and can be carried across the normalization boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The binary (bincode) codec rejected the value or the bytes
    #[error("binary codec: {0}")]
    Binary(String),

    /// The JSON codec rejected the value or the bytes
    #[error("json codec: {0}")]
    Json(String),

    /// A message could not be built from a plain structure
    #[error("{0}")]
    Construct(String),

    /// Bytes decoded into an envelope that breaks the one-slot rule
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        CodecError::Binary(err.to_string())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorReason;

    #[test]
    fn test_bad_response_type_message() {
        let error = Error::BadResponseType {
            expected: "Greeting".to_string(),
            actual: "Farewell".to_string(),
        };
        let display = error.to_string();

        assert!(display.contains("Greeting"));
        assert!(display.contains("Farewell"));
    }

    #[test]
    fn test_protocol_error_keeps_original_message() {
        let codec_error = CodecError::Binary("sequence too long".to_string());
        let error = Error::Protocol(codec_error.to_string());

        assert!(error.to_string().contains("sequence too long"));
    }

    #[test]
    fn test_codec_error_from_serde() {
        let serde_error = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let error = CodecError::from(serde_error);

        match error {
            CodecError::Json(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Json codec error"),
        }
    }

    #[test]
    fn test_codec_error_from_bincode() {
        let bincode_error = bincode::deserialize::<String>(&[1]).unwrap_err();
        let error = CodecError::from(bincode_error);

        assert!(matches!(error, CodecError::Binary(_)));
    }

    #[test]
    fn test_to_rpc_error_reasons() {
        let cases = vec![
            (
                Error::BadResponseType {
                    expected: "A".into(),
                    actual: "B".into(),
                },
                ErrorReason::BadResponseProto,
            ),
            (
                Error::Construct {
                    expected: "A".into(),
                    message: "missing field".into(),
                },
                ErrorReason::BadResponseProto,
            ),
            (Error::Protocol("boom".into()), ErrorReason::RpcError),
            (
                Error::Codec(CodecError::Json("eof".into())),
                ErrorReason::RpcError,
            ),
            (Error::MissingContext("response type"), ErrorReason::RpcFailed),
        ];

        for (error, reason) in cases {
            let rpc_error = error.to_rpc_error();
            assert_eq!(rpc_error.reason, reason);
            assert_eq!(rpc_error.message, error.to_string());
        }
    }

    #[test]
    fn test_to_rpc_error_passes_remote_error_through() {
        let remote = RpcError::new("TIMEOUT", "timeout");
        let error = Error::from(remote.clone());

        assert_eq!(error.to_rpc_error(), remote);
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(Error::Protocol("x".into()).kind(), "protocol");
        assert_eq!(Error::MissingContext("response").kind(), "missing_context");
    }
}
