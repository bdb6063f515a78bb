//! sockrpc - response pipeline for a socket RPC server
//!
//! This is the main convenience crate that re-exports all sockrpc sub-crates.
//! Use this crate if you want a single dependency that provides the message
//! types, the envelope codec and the server-side encoder.
//!
//! # Architecture
//!
//! sockrpc is organized into modular crates:
//!
//! - **sockrpc-core**: Message types, envelope, codec, error handling, observability
//! - **sockrpc-server**: Call context, candidates, response encoder, middleware
//! - **sockrpc-macros**: `#[derive(Message)]`
//!
//! # Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use sockrpc::macros::Message;
//! use sockrpc::{Candidate, Codec, Env, ResponseEncoder, ResponseEnvelope, ResponseType};
//!
//! #[derive(Debug, Serialize, Deserialize, Message)]
//! #[message(package = "greeter")]
//! struct Greeting {
//!     text: String,
//! }
//!
//! let encoder = ResponseEncoder::new(Codec::Binary);
//! let mut env = Env::new("Greeter", "greet")
//!     .with_response_type(ResponseType::of::<Greeting>())
//!     .with_response(Candidate::message(Greeting { text: "hi".into() }));
//!
//! encoder.process(&mut env).unwrap();
//!
//! let wire = env.encoded_response.unwrap();
//! let envelope = ResponseEnvelope::decode(Codec::Binary, &wire).unwrap();
//! let greeting: Greeting = envelope.into_message(Codec::Binary).unwrap();
//! assert_eq!(greeting.text, "hi");
//! ```

// Re-export all public APIs from sub-crates
pub use sockrpc_core as core;
pub use sockrpc_macros as macros;
pub use sockrpc_server as server;

// Convenience re-exports of the most commonly used types
pub use sockrpc_core::{Codec, Error, Message, ResponseEnvelope, ResponseType, RpcError};
pub use sockrpc_server::{Candidate, Env, MiddlewareChain, ResponseEncoder};
