//! Candidate responses produced by handlers
//!
//! A handler may answer a call with several shapes of value. The shape is
//! fixed when the candidate is built, and the response encoder handles each
//! shape with exactly one branch, in this priority order:
//!
//! 1. **Message**: already a typed message
//! 2. **Convertible**: can turn itself into a typed message
//! 3. **Structure**: a plain key/value structure
//! 4. **Error**: an application error value
//! 5. **Unrecognized**: anything else; always fails validation
//!
//! # Examples
//!
//! ```rust
//! use sockrpc_server::Candidate;
//! use sockrpc_core::RpcError;
//!
//! let plain = Candidate::structure(serde_json::json!({"text": "hi"}));
//! assert_eq!(plain.kind(), "structure");
//!
//! let failed = Candidate::error(RpcError::new("TIMEOUT", "timeout"));
//! assert!(failed.is_error());
//! ```

use serde::Serialize;
use sockrpc_core::{AnyMessage, CodecError, Message, RpcError};
use std::fmt;

/// Capability of turning a domain value into a typed message
///
/// Implement it for domain types that know their wire representation. The
/// produced message is still checked against the call's response type.
pub trait IntoMessage: fmt::Debug + Send + Sync {
    fn to_message(&self) -> Box<dyn AnyMessage>;
}

/// A value of a type the pipeline has no handling for
///
/// Keeps the type name and a debug rendering of the value, which is all
/// validation and logging need. Whatever it was built from, an `Opaque` is
/// never a message type, so it can never pass validation.
#[derive(Clone, PartialEq, Eq)]
pub struct Opaque {
    type_name: &'static str,
    inspect: String,
}

impl Opaque {
    pub fn new<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inspect: format!("{:?}", value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name, self.inspect)
    }
}

/// Value a handler produced as the answer to a call
#[derive(Debug)]
pub enum Candidate {
    /// A typed message, validated against the response type as-is
    Message(Box<dyn AnyMessage>),
    /// A value converted to a typed message, then validated
    Convertible(Box<dyn IntoMessage>),
    /// A plain structure used to construct the response type
    Structure(serde_json::Value),
    /// An application error value, wrapped without validation
    Error(RpcError),
    /// Anything else
    Unrecognized(Opaque),
}

impl Candidate {
    pub fn message<M: Message>(message: M) -> Self {
        Candidate::Message(Box::new(message))
    }

    pub fn convertible<C: IntoMessage + 'static>(value: C) -> Self {
        Candidate::Convertible(Box::new(value))
    }

    pub fn structure(value: serde_json::Value) -> Self {
        Candidate::Structure(value)
    }

    /// Plain structure built from any serializable value
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, CodecError> {
        Ok(Candidate::Structure(serde_json::to_value(value)?))
    }

    pub fn error(error: RpcError) -> Self {
        Candidate::Error(error)
    }

    pub fn opaque<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Candidate::Unrecognized(Opaque::new(value))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Candidate::Error(_))
    }

    /// Short name of the shape, for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Candidate::Message(_) => "message",
            Candidate::Convertible(_) => "convertible",
            Candidate::Structure(_) => "structure",
            Candidate::Error(_) => "error",
            Candidate::Unrecognized(_) => "unrecognized",
        }
    }
}

impl From<RpcError> for Candidate {
    fn from(error: RpcError) -> Self {
        Candidate::Error(error)
    }
}

impl From<serde_json::Value> for Candidate {
    fn from(value: serde_json::Value) -> Self {
        Candidate::Structure(value)
    }
}

impl From<Box<dyn AnyMessage>> for Candidate {
    fn from(message: Box<dyn AnyMessage>) -> Self {
        Candidate::Message(message)
    }
}
