//! Response envelope
//!
//! The envelope is the single wire shape every response takes. It has two
//! mutually exclusive payload slots:
//!
//! | Field | Populated when |
//! |---|---|
//! | `response_bytes` | success path |
//! | `error_message`, `error_reason` | error path |
//!
//! A decoder branches on "is `error_message` present?" to tell the two apart.
//! The only way to build an envelope is through `success` or `failure`, so an
//! envelope with both or neither slot filled cannot be constructed locally;
//! `decode` rejects such envelopes when they arrive from elsewhere.

use crate::codec::Codec;
use crate::error::{CodecError, Error, Result};
use crate::types::{ErrorReason, Message, RpcError};
use serde::{Deserialize, Serialize};

/// Wire-level response record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    response_bytes: Option<Vec<u8>>,
    error_message: Option<String>,
    error_reason: Option<ErrorReason>,
}

impl ResponseEnvelope {
    /// Envelope carrying an encoded response message
    pub fn success(response_bytes: Vec<u8>) -> Self {
        Self {
            response_bytes: Some(response_bytes),
            error_message: None,
            error_reason: None,
        }
    }

    /// Envelope carrying an application error value
    pub fn failure(error: &RpcError) -> Self {
        Self {
            response_bytes: None,
            error_message: Some(error.message.clone()),
            error_reason: Some(error.reason.clone()),
        }
    }

    pub fn response_bytes(&self) -> Option<&[u8]> {
        self.response_bytes.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn error_reason(&self) -> Option<&ErrorReason> {
        self.error_reason.as_ref()
    }

    /// True for the error form
    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// The error value carried by an error envelope
    ///
    /// A missing reason on an error envelope reads as `RPC_ERROR`.
    pub fn error(&self) -> Option<RpcError> {
        self.error_message.as_ref().map(|message| {
            RpcError::new(
                self.error_reason.clone().unwrap_or(ErrorReason::RpcError),
                message.clone(),
            )
        })
    }

    /// Serialize the envelope
    pub fn encode(&self, codec: Codec) -> std::result::Result<Vec<u8>, CodecError> {
        codec.encode(self)
    }

    /// Deserialize an envelope and check that exactly one slot is populated
    pub fn decode(codec: Codec, bytes: &[u8]) -> std::result::Result<Self, CodecError> {
        let envelope: Self = codec.decode(bytes)?;
        match (envelope.response_bytes.is_some(), envelope.error_message.is_some()) {
            (true, true) => Err(CodecError::MalformedEnvelope(
                "both response and error are present",
            )),
            (false, false) => Err(CodecError::MalformedEnvelope(
                "neither response nor error is present",
            )),
            _ => Ok(envelope),
        }
    }

    /// Client-side decode path: the response message or the remote error
    ///
    /// # Errors
    ///
    /// - `Error::Rpc` if this is an error envelope
    /// - `Error::Codec` if the response bytes are not a valid `T`
    pub fn into_message<T: Message>(self, codec: Codec) -> Result<T> {
        if let Some(error) = self.error() {
            return Err(Error::Rpc(error));
        }
        let bytes = self
            .response_bytes
            .ok_or(CodecError::MalformedEnvelope("missing response bytes"))?;
        Ok(codec.decode(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Greeting {
        text: String,
    }

    impl Message for Greeting {
        const NAME: &'static str = "test.Greeting";
    }

    #[test]
    fn test_success_envelope_slots() {
        let envelope = ResponseEnvelope::success(vec![1, 2, 3]);

        assert_eq!(envelope.response_bytes(), Some(&[1u8, 2, 3][..]));
        assert!(envelope.error_message().is_none());
        assert!(envelope.error_reason().is_none());
        assert!(!envelope.is_error());
    }

    #[test]
    fn test_failure_envelope_slots() {
        let envelope = ResponseEnvelope::failure(&RpcError::new("TIMEOUT", "timeout"));

        assert!(envelope.response_bytes().is_none());
        assert_eq!(envelope.error_message(), Some("timeout"));
        assert_eq!(envelope.error_reason().map(|r| r.as_str()), Some("TIMEOUT"));
        assert!(envelope.is_error());
    }

    #[test]
    fn test_empty_response_is_still_success() {
        let bytes = ResponseEnvelope::success(Vec::new())
            .encode(Codec::Binary)
            .unwrap();
        let envelope = ResponseEnvelope::decode(Codec::Binary, &bytes).unwrap();

        assert_eq!(envelope.response_bytes(), Some(&b""[..]));
    }

    #[test]
    fn test_decode_rejects_two_slots() {
        let broken = ResponseEnvelope {
            response_bytes: Some(vec![1]),
            error_message: Some("boom".into()),
            error_reason: None,
        };
        let bytes = broken.encode(Codec::Json).unwrap();

        let err = ResponseEnvelope::decode(Codec::Json, &bytes).unwrap_err();
        assert!(matches!(err, CodecError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_decode_rejects_empty_envelope() {
        let bytes = br#"{"response_bytes":null,"error_message":null,"error_reason":null}"#;

        let err = ResponseEnvelope::decode(Codec::Json, bytes).unwrap_err();
        assert!(matches!(err, CodecError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_into_message_success() {
        let payload = Codec::Binary
            .encode(&Greeting { text: "hi".into() })
            .unwrap();
        let greeting: Greeting = ResponseEnvelope::success(payload)
            .into_message(Codec::Binary)
            .unwrap();

        assert_eq!(greeting, Greeting { text: "hi".into() });
    }

    #[test]
    fn test_into_message_error_form() {
        let envelope = ResponseEnvelope::failure(&RpcError::method_not_found("wave"));
        let err = envelope.into_message::<Greeting>(Codec::Json).unwrap_err();

        match err {
            Error::Rpc(remote) => assert_eq!(remote.reason, ErrorReason::MethodNotFound),
            other => panic!("Expected Rpc error, got {other:?}"),
        }
    }

    #[test]
    fn test_into_message_bad_payload() {
        let envelope = ResponseEnvelope::success(b"not json".to_vec());
        let err = envelope.into_message::<Greeting>(Codec::Json).unwrap_err();

        assert!(matches!(err, Error::Codec(CodecError::Json(_))));
    }

    #[test]
    fn test_json_wire_shape() {
        let bytes = ResponseEnvelope::failure(&RpcError::new("TIMEOUT", "timeout"))
            .encode(Codec::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["error_message"], "timeout");
        assert_eq!(value["error_reason"], "TIMEOUT");
        assert!(value["response_bytes"].is_null());
    }
}
