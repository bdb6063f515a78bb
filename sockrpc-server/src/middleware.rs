//! Middleware chain around a call's handler
//!
//! Middleware intercepts a call before and after its handler runs. The
//! response encoder is itself middleware: its post-handle step turns the
//! handler's candidate into the encoded envelope.
//!
//! # Middleware Chain
//!
//! Middleware is executed in order as a chain. Each middleware can:
//! - Inspect and modify the context before the handler
//! - Short-circuit execution with its own candidate response
//! - Inspect and modify the context after the handler
//! - Pass metadata to subsequent middleware
//!
//! A short-circuit skips the remaining pre-handle steps and the handler.
//! Post-handle steps always run for every middleware, in reverse order, so
//! the response encoder encodes short-circuited answers too. Put the encoder
//! *after* middleware that wants to see the encoded response, so that it is
//! the innermost post step.
//!
//! Everything runs synchronously on the caller's thread.
//!
//! # Examples
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//! use sockrpc_core::{Codec, Message, ResponseType, RpcError};
//! use sockrpc_server::{Candidate, Env, MiddlewareChain, ResponseEncoder, TracingMiddleware};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Ack {
//!     ok: bool,
//! }
//!
//! impl Message for Ack {
//!     const NAME: &'static str = "demo.Ack";
//! }
//!
//! let mut chain = MiddlewareChain::new();
//! chain.add(Arc::new(TracingMiddleware::new()));
//! chain.add(Arc::new(ResponseEncoder::new(Codec::Binary)));
//!
//! let env = Env::new("Greeter", "greet").with_response_type(ResponseType::of::<Ack>());
//! let env = chain
//!     .execute(env, |_env| Candidate::error(RpcError::rpc_failed("not today")))
//!     .unwrap();
//! assert!(env.encoded_response.is_some());
//! ```

use crate::candidate::Candidate;
use crate::env::Env;
use serde_json::Value;
use sockrpc_core::Result;
use std::sync::Arc;
use std::time::Instant;

/// Action to take after middleware pre-processing
#[derive(Debug)]
pub enum MiddlewareAction {
    /// Continue to next middleware/handler
    Continue,
    /// Skip the handler and answer with this candidate
    ShortCircuit(Candidate),
}

/// Interceptor around a call's handler
pub trait Middleware: Send + Sync {
    /// Called before handler execution
    fn pre_handle(&self, env: &mut Env) -> Result<MiddlewareAction>;

    /// Called after handler execution; errors abort the remaining post steps
    fn post_handle(&self, env: &mut Env) -> Result<()>;
}

/// Chain of middleware to execute in order
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Builder-style `add`
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Run the chain around `handler`, whose return value becomes the
    /// call's candidate response
    pub fn execute<F>(&self, mut env: Env, handler: F) -> Result<Env>
    where
        F: FnOnce(&Env) -> Candidate,
    {
        let mut short_circuit = None;

        for middleware in &self.middlewares {
            match middleware.pre_handle(&mut env)? {
                MiddlewareAction::Continue => continue,
                MiddlewareAction::ShortCircuit(candidate) => {
                    short_circuit = Some(candidate);
                    break;
                }
            }
        }

        let candidate = match short_circuit {
            Some(candidate) => candidate,
            None => handler(&env),
        };
        env.response = Some(candidate);

        for middleware in self.middlewares.iter().rev() {
            middleware.post_handle(&mut env)?;
        }

        Ok(env)
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

/// Logs call start and completion inside an `rpc_call` span
///
/// Records the call's start time in the `start_us` metadata key.
pub struct TracingMiddleware {
    epoch: Instant,
}

impl TracingMiddleware {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    fn span(env: &Env) -> tracing::Span {
        tracing::info_span!(
            "rpc_call",
            rpc = %env.rpc_name(),
            request_id = ?env.request_id,
            caller = ?env.caller,
        )
    }
}

impl Default for TracingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for TracingMiddleware {
    fn pre_handle(&self, env: &mut Env) -> Result<MiddlewareAction> {
        let span = Self::span(env);
        let _enter = span.enter();

        let start_us = self.epoch.elapsed().as_micros() as u64;
        env.insert_metadata("start_us", Value::from(start_us));
        tracing::debug!("Call started");

        Ok(MiddlewareAction::Continue)
    }

    fn post_handle(&self, env: &mut Env) -> Result<()> {
        let span = Self::span(env);
        let _enter = span.enter();

        let elapsed_us = env
            .get_metadata("start_us")
            .and_then(Value::as_u64)
            .map(|start| (self.epoch.elapsed().as_micros() as u64).saturating_sub(start));
        let is_error = env
            .validated_response
            .as_ref()
            .map(|validated| validated.is_error());

        tracing::info!(
            elapsed_us = ?elapsed_us,
            error_response = ?is_error,
            encoded_bytes = ?env.encoded_response.as_ref().map(Vec::len),
            "Call completed"
        );

        Ok(())
    }
}
