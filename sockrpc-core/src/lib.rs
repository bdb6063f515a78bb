//! Core types for the sockrpc response pipeline
//!
//! This crate provides the pieces both ends of a call agree on:
//!
//! - **Types**: typed messages, the expected response type, error values
//! - **Envelope**: the single wire shape every response takes
//! - **Codec**: binary and JSON serialization of messages and envelopes
//! - **Error handling**: the bounded error taxonomy of the pipeline
//! - **Observability**: tracing subscriber and OpenTelemetry setup
//!
//! # Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use sockrpc_core::{Codec, Message, ResponseEnvelope};
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
//! // Server side: wrap an encoded message
//! let payload = Codec::Binary.encode(&Greeting { text: "hi".into() }).unwrap();
//! let wire = ResponseEnvelope::success(payload).encode(Codec::Binary).unwrap();
//!
//! // Client side: unwrap it again
//! let envelope = ResponseEnvelope::decode(Codec::Binary, &wire).unwrap();
//! let greeting: Greeting = envelope.into_message(Codec::Binary).unwrap();
//! assert_eq!(greeting.text, "hi");
//! ```

pub mod codec;
pub mod envelope;
pub mod error;
pub mod observability;
pub mod types;

pub use codec::Codec;
pub use envelope::ResponseEnvelope;
pub use error::{CodecError, Error, Result};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{AnyMessage, ErrorReason, Message, ResponseType, RpcError};
