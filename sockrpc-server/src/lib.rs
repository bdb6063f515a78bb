//! Server-side response pipeline for sockrpc
//!
//! This crate hosts the final stage of a call: turning whatever a handler
//! produced into the bytes the transport writes back to the client.
//!
//! # Core Pieces
//!
//! - **Env**: the per-call context that flows through the pipeline
//! - **Candidate**: the closed set of shapes a handler may answer with
//! - **ResponseEncoder**: validates the candidate against the declared
//!   response type and encodes it into a `ResponseEnvelope`
//! - **MiddlewareChain**: runs middleware (the encoder included) around a
//!   handler
//! - **EncoderMetrics**: OpenTelemetry instruments for the encoder
//!
//! # Data Flow
//!
//! ```text
//! Env in -> candidate -> validated response -> envelope -> Env out (encoded_response)
//! ```
//!
//! The encoder holds no per-call state. Every `Env` is owned by the worker
//! handling that call, so the pipeline needs no locks.

pub mod candidate;
pub mod config;
pub mod env;
pub mod metrics;
pub mod middleware;
pub mod response_encoder;

pub use candidate::{Candidate, IntoMessage, Opaque};
pub use config::EncoderConfig;
pub use env::{Env, ValidatedResponse};
pub use metrics::EncoderMetrics;
pub use middleware::{Middleware, MiddlewareAction, MiddlewareChain, TracingMiddleware};
pub use response_encoder::{ResponseEncoder, DEFAULT_LOG_SIGNATURE};
