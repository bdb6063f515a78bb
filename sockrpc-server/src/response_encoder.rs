//! Response encoder
//!
//! The last stage of the server's response pipeline. It takes whatever the
//! handler chain left in `Env::response`, checks it against the call's
//! declared response type, serializes it and wraps it in a
//! `ResponseEnvelope`. Error values produced by the application take the same
//! route and end up in the error form of the envelope, so clients decode
//! every response the same way.
//!
//! # Stages
//!
//! 1. **Normalize**: reduce the candidate to a `ValidatedResponse`, stored
//!    in `Env::validated_response`
//! 2. **Wrap and encode**: build the envelope and serialize it into
//!    `Env::encoded_response`
//!
//! Each stage runs at most once per `Env`. Calling `process` again on the
//! same context finds both slots filled and does nothing, so nothing is
//! logged or encoded twice.
//!
//! # Failures
//!
//! - `Error::BadResponseType` when the candidate's type is not the declared
//!   one
//! - `Error::Construct` when a plain structure does not fit the declared type
//! - `Error::Protocol` for anything that goes wrong while encoding; codec
//!   errors never leave this module in their own form
//!
//! None of them are recovered here. The request layer decides whether to
//! send `fallback_response` to the client or drop the connection.
//!
//! # Examples
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use sockrpc_core::{Codec, Message, ResponseEnvelope, ResponseType};
//! use sockrpc_server::{Candidate, Env, ResponseEncoder};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Greeting {
//!     text: String,
//! }
//!
//! impl Message for Greeting {
//!     const NAME: &'static str = "demo.Greeting";
//! }
//!
//! let encoder = ResponseEncoder::new(Codec::Binary);
//! let mut env = Env::new("Greeter", "greet")
//!     .with_response_type(ResponseType::of::<Greeting>())
//!     .with_response(Candidate::structure(serde_json::json!({"text": "hi"})));
//!
//! encoder.process(&mut env).unwrap();
//!
//! let wire = env.encoded_response.unwrap();
//! let envelope = ResponseEnvelope::decode(Codec::Binary, &wire).unwrap();
//! let greeting: Greeting = envelope.into_message(Codec::Binary).unwrap();
//! assert_eq!(greeting.text, "hi");
//! ```

use crate::candidate::{Candidate, Opaque};
use crate::config::EncoderConfig;
use crate::env::{Env, ValidatedResponse};
use crate::metrics::EncoderMetrics;
use crate::middleware::{Middleware, MiddlewareAction};
use sockrpc_core::{AnyMessage, Codec, CodecError, Error, ResponseEnvelope, ResponseType, Result};
use std::any::TypeId;
use std::sync::Arc;

/// Log signature used when the call context does not carry one
pub const DEFAULT_LOG_SIGNATURE: &str = "[ResponseEncoder]";

/// Final stage of the response pipeline
///
/// Stateless across calls: all per-call state lives in the `Env`, so one
/// encoder can be shared by every worker.
#[derive(Clone, Default)]
pub struct ResponseEncoder {
    codec: Codec,
    metrics: Option<Arc<EncoderMetrics>>,
}

impl ResponseEncoder {
    pub fn new(codec: Codec) -> Self {
        Self {
            codec,
            metrics: None,
        }
    }

    pub fn from_config(config: &EncoderConfig) -> Self {
        let encoder = Self::new(config.codec);
        if config.enable_metrics {
            encoder.with_metrics(Arc::new(EncoderMetrics::new(config.service_name.clone())))
        } else {
            encoder
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<EncoderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Fill `validated_response` and `encoded_response` of the context
    ///
    /// Requires `response` and `response_type` to be set. Slots that are
    /// already filled are left untouched.
    pub fn process(&self, env: &mut Env) -> Result<()> {
        let result = self.run(env);
        if let (Err(err), Some(metrics)) = (&result, &self.metrics) {
            metrics.record_failure(&env.rpc_name(), err.kind());
        }
        result
    }

    /// `process` for callers that pass the context by value
    pub fn call(&self, mut env: Env) -> Result<Env> {
        self.process(&mut env)?;
        Ok(env)
    }

    fn run(&self, env: &mut Env) -> Result<()> {
        if env.validated_response.is_none() {
            let validated = normalize(env)?;
            env.validated_response = Some(validated);
        }

        if env.encoded_response.is_none() {
            let encoded = self.encode(env)?;
            env.encoded_response = Some(encoded);
        }

        Ok(())
    }

    /// Serialize the validated response inside an envelope
    fn encode(&self, env: &Env) -> Result<Vec<u8>> {
        let validated = env
            .validated_response
            .as_ref()
            .ok_or(Error::MissingContext("validated response"))?;
        let signature = log_signature(env);
        let rpc = env.rpc_name();

        tracing::debug!(
            signature = %signature,
            rpc = %rpc,
            response = ?validated,
            "Encoding response"
        );

        let encoded = self
            .wrap(validated)
            .and_then(|envelope| envelope.encode(self.codec))
            .map_err(|err| {
                tracing::error!(
                    signature = %signature,
                    rpc = %rpc,
                    codec = %self.codec,
                    error = %err,
                    "Failed to encode response"
                );
                Error::Protocol(err.to_string())
            })?;

        if let Some(metrics) = &self.metrics {
            let form = if validated.is_error() { "error" } else { "success" };
            metrics.record_response(&rpc, form, encoded.len());
        }

        Ok(encoded)
    }

    /// Put the validated response in the right slot of the envelope
    pub fn wrap(
        &self,
        validated: &ValidatedResponse,
    ) -> std::result::Result<ResponseEnvelope, CodecError> {
        match validated {
            ValidatedResponse::Error(error) => Ok(ResponseEnvelope::failure(error)),
            ValidatedResponse::Message(message) => {
                Ok(ResponseEnvelope::success(message.encode(self.codec)?))
            }
        }
    }

    /// Minimal error envelope describing a pipeline failure
    ///
    /// For the request layer to send when `process` fails and it still wants
    /// to answer the client.
    pub fn fallback_response(&self, err: &Error) -> Result<Vec<u8>> {
        ResponseEnvelope::failure(&err.to_rpc_error())
            .encode(self.codec)
            .map_err(|e| Error::Protocol(e.to_string()))
    }
}

impl Middleware for ResponseEncoder {
    fn pre_handle(&self, _env: &mut Env) -> Result<MiddlewareAction> {
        Ok(MiddlewareAction::Continue)
    }

    fn post_handle(&self, env: &mut Env) -> Result<()> {
        self.process(env)
    }
}

fn log_signature(env: &Env) -> &str {
    env.log_signature.as_deref().unwrap_or(DEFAULT_LOG_SIGNATURE)
}

/// Reduce the candidate to a message of the declared type or an error value
///
/// The candidate is checked in place. It moves out of `env.response` only
/// once it is valid, so a failed call leaves it there and fails the same way
/// when repeated.
fn normalize(env: &mut Env) -> Result<ValidatedResponse> {
    let expected = env
        .response_type
        .ok_or(Error::MissingContext("response type"))?;
    let candidate = env
        .response
        .as_ref()
        .ok_or(Error::MissingContext("response"))?;

    let built = match candidate {
        Candidate::Message(message) => {
            validate(&expected, &**message)?;
            None
        }
        Candidate::Convertible(value) => {
            let message = value.to_message();
            validate(&expected, &*message)?;
            Some(message)
        }
        Candidate::Structure(structure) => Some(expected.construct(structure.clone()).map_err(
            |err| Error::Construct {
                expected: expected.name().to_string(),
                message: err.to_string(),
            },
        )?),
        Candidate::Error(_) => None,
        Candidate::Unrecognized(opaque) => {
            // `Opaque` is never a message type, so the check always fails
            expected.check(TypeId::of::<Opaque>(), opaque.type_name())?;
            return Err(Error::BadResponseType {
                expected: expected.name().to_string(),
                actual: opaque.type_name().to_string(),
            });
        }
    };

    match (built, env.response.take()) {
        (Some(message), _) => Ok(ValidatedResponse::Message(message)),
        (None, Some(Candidate::Message(message))) => Ok(ValidatedResponse::Message(message)),
        (None, Some(Candidate::Error(error))) => Ok(ValidatedResponse::Error(error)),
        (None, _) => Err(Error::MissingContext("response")),
    }
}

fn validate(expected: &ResponseType, message: &dyn AnyMessage) -> Result<()> {
    expected.check(message.message_type_id(), message.type_name())
}
