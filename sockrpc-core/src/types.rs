//! Typed messages, schema identity and error values
//!
//! Every response that reaches the wire is either a typed message whose
//! schema matches the call's declared response type, or an error value.
//! This module defines both halves:
//!
//! - **Message / AnyMessage**: a schema-named struct and its object-safe view
//! - **ResponseType**: the expected-schema identifier a call carries
//! - **ErrorReason / RpcError**: the application-level error value
//!
//! # Schema Identity
//!
//! A schema is identified by the Rust type implementing `Message`. Two
//! messages are "the same schema" only when their runtime `TypeId`s match;
//! the schema `NAME` is used for diagnostics and error messages only, so two
//! structs that happen to share a name are still told apart.
//!
//! # Examples
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use sockrpc_core::{Message, ResponseType};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Greeting {
//!     text: String,
//! }
//!
//! impl Message for Greeting {
//!     const NAME: &'static str = "demo.Greeting";
//! }
//!
//! let expected = ResponseType::of::<Greeting>();
//! assert_eq!(expected.name(), "demo.Greeting");
//! ```

use crate::codec::Codec;
use crate::error::{CodecError, Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;

/// A typed message with a schema name
///
/// Implemented by hand or with `#[derive(Message)]` from `sockrpc-macros`.
/// The serde implementations are what the codec layer uses to encode the
/// message and to construct it from a plain structure.
pub trait Message: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static {
    /// Fully-qualified schema name, e.g. `"demo.Greeting"`
    const NAME: &'static str;
}

/// Object-safe view of a typed message
///
/// The response pipeline handles messages whose concrete type is only known
/// at runtime. `AnyMessage` exposes exactly what the pipeline needs: schema
/// identity, encoding and downcasting. It is implemented for every `Message`.
pub trait AnyMessage: fmt::Debug + Send + Sync {
    /// Schema name of the concrete message type
    fn type_name(&self) -> &'static str;

    /// Runtime identity of the concrete message type
    fn message_type_id(&self) -> TypeId;

    /// Encode the message with the given codec
    fn encode(&self, codec: Codec) -> std::result::Result<Vec<u8>, CodecError>;

    /// Access the concrete value for downcasting
    fn as_any(&self) -> &dyn Any;
}

impl<T: Message> AnyMessage for T {
    fn type_name(&self) -> &'static str {
        T::NAME
    }

    fn message_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn encode(&self, codec: Codec) -> std::result::Result<Vec<u8>, CodecError> {
        codec.encode(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyMessage {
    /// Returns true if the message is of type `T`
    pub fn is<T: Message>(&self) -> bool {
        self.message_type_id() == TypeId::of::<T>()
    }

    /// Borrow the message as `T` if that is its concrete type
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

type ConstructFn =
    fn(serde_json::Value) -> std::result::Result<Box<dyn AnyMessage>, CodecError>;

/// The expected response schema of a call
///
/// Carried by the call context and consulted by the response encoder. It
/// knows the schema's identity (for validation) and how to build an instance
/// of the schema from a plain key/value structure.
#[derive(Clone, Copy)]
pub struct ResponseType {
    name: &'static str,
    type_id: TypeId,
    construct: ConstructFn,
}

fn construct_message<T: Message>(
    structure: serde_json::Value,
) -> std::result::Result<Box<dyn AnyMessage>, CodecError> {
    let message: T =
        serde_json::from_value(structure).map_err(|e| CodecError::Construct(e.to_string()))?;
    Ok(Box::new(message))
}

impl ResponseType {
    /// Descriptor for the message type `T`
    pub fn of<T: Message>() -> Self {
        Self {
            name: T::NAME,
            type_id: TypeId::of::<T>(),
            construct: construct_message::<T>,
        }
    }

    /// Schema name of the expected type
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if `T` is the expected type
    pub fn is<T: Message>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Check a runtime type identity against the expected schema
    ///
    /// Pure and total: returns `Ok(())` on a match and
    /// `Error::BadResponseType` naming both types otherwise.
    pub fn check(&self, actual: TypeId, actual_name: &str) -> Result<()> {
        if self.type_id != actual {
            return Err(Error::BadResponseType {
                expected: self.name.to_string(),
                actual: actual_name.to_string(),
            });
        }
        Ok(())
    }

    /// Build an instance of the expected type from a plain structure
    ///
    /// The expected type's own deserializer enforces the shape: missing or
    /// mistyped fields fail, unknown fields are ignored.
    pub fn construct(
        &self,
        structure: serde_json::Value,
    ) -> std::result::Result<Box<dyn AnyMessage>, CodecError> {
        (self.construct)(structure)
    }
}

impl fmt::Debug for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResponseType").field(&self.name).finish()
    }
}

impl PartialEq for ResponseType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ResponseType {}

/// Reason code attached to an error value
///
/// The well-known codes are the socket-RPC reason enumeration. Applications
/// can use any other code (e.g. `"TIMEOUT"`); it is carried verbatim in
/// `Other`. On the wire a reason is always its string form.
///
/// # Examples
///
/// ```rust
/// use sockrpc_core::ErrorReason;
///
/// assert_eq!(ErrorReason::from("METHOD_NOT_FOUND"), ErrorReason::MethodNotFound);
/// assert_eq!(ErrorReason::from("TIMEOUT").as_str(), "TIMEOUT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorReason {
    BadRequestData,
    BadRequestProto,
    ServiceNotFound,
    MethodNotFound,
    RpcError,
    RpcFailed,
    InvalidRequestProto,
    BadResponseProto,
    UnknownHost,
    IoError,
    /// Application-defined reason code
    Other(String),
}

impl ErrorReason {
    /// String form of the reason code
    pub fn as_str(&self) -> &str {
        match self {
            ErrorReason::BadRequestData => "BAD_REQUEST_DATA",
            ErrorReason::BadRequestProto => "BAD_REQUEST_PROTO",
            ErrorReason::ServiceNotFound => "SERVICE_NOT_FOUND",
            ErrorReason::MethodNotFound => "METHOD_NOT_FOUND",
            ErrorReason::RpcError => "RPC_ERROR",
            ErrorReason::RpcFailed => "RPC_FAILED",
            ErrorReason::InvalidRequestProto => "INVALID_REQUEST_PROTO",
            ErrorReason::BadResponseProto => "BAD_RESPONSE_PROTO",
            ErrorReason::UnknownHost => "UNKNOWN_HOST",
            ErrorReason::IoError => "IO_ERROR",
            ErrorReason::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorReason {
    fn from(code: &str) -> Self {
        match code {
            "BAD_REQUEST_DATA" => ErrorReason::BadRequestData,
            "BAD_REQUEST_PROTO" => ErrorReason::BadRequestProto,
            "SERVICE_NOT_FOUND" => ErrorReason::ServiceNotFound,
            "METHOD_NOT_FOUND" => ErrorReason::MethodNotFound,
            "RPC_ERROR" => ErrorReason::RpcError,
            "RPC_FAILED" => ErrorReason::RpcFailed,
            "INVALID_REQUEST_PROTO" => ErrorReason::InvalidRequestProto,
            "BAD_RESPONSE_PROTO" => ErrorReason::BadResponseProto,
            "UNKNOWN_HOST" => ErrorReason::UnknownHost,
            "IO_ERROR" => ErrorReason::IoError,
            other => ErrorReason::Other(other.to_string()),
        }
    }
}

impl From<String> for ErrorReason {
    fn from(code: String) -> Self {
        ErrorReason::from(code.as_str())
    }
}

impl From<ErrorReason> for String {
    fn from(reason: ErrorReason) -> Self {
        match reason {
            ErrorReason::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level error value
///
/// Handlers return this instead of a typed message to report a failure to
/// the client. The response encoder wraps it into the error form of the
/// envelope without checking it against the response schema.
///
/// Immutable once constructed: fields are public for reading, but there are
/// no setters and every constructor takes both parts up front.
///
/// # Examples
///
/// ```rust
/// use sockrpc_core::{ErrorReason, RpcError};
///
/// let timeout = RpcError::new("TIMEOUT", "timeout");
/// assert_eq!(timeout.reason.as_str(), "TIMEOUT");
///
/// let missing = RpcError::method_not_found("Greeter#wave");
/// assert_eq!(missing.reason, ErrorReason::MethodNotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Machine-readable reason code
    pub reason: ErrorReason,
    /// Human-readable message
    pub message: String,
}

impl RpcError {
    /// Create an error value with any reason code
    pub fn new(reason: impl Into<ErrorReason>, message: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            message: message.into(),
        }
    }

    pub fn bad_request_data(msg: impl Into<String>) -> Self {
        Self::new(ErrorReason::BadRequestData, msg)
    }

    pub fn bad_request_proto(msg: impl Into<String>) -> Self {
        Self::new(ErrorReason::BadRequestProto, msg)
    }

    pub fn service_not_found(service: impl Into<String>) -> Self {
        Self::new(
            ErrorReason::ServiceNotFound,
            format!("Service not found: {}", service.into()),
        )
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            ErrorReason::MethodNotFound,
            format!("Method not found: {}", method.into()),
        )
    }

    /// Generic failure while running the RPC
    pub fn rpc_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorReason::RpcError, msg)
    }

    /// The RPC could not be completed by the server
    pub fn rpc_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorReason::RpcFailed, msg)
    }

    pub fn invalid_request_proto(msg: impl Into<String>) -> Self {
        Self::new(ErrorReason::InvalidRequestProto, msg)
    }

    pub fn bad_response_proto(msg: impl Into<String>) -> Self {
        Self::new(ErrorReason::BadResponseProto, msg)
    }

    pub fn unknown_host(host: impl Into<String>) -> Self {
        Self::new(
            ErrorReason::UnknownHost,
            format!("Unknown host: {}", host.into()),
        )
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorReason::IoError, msg)
    }
}

impl fmt::Display for RpcError {
    /// Formats as "[REASON] message"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.reason, self.message)
    }
}

impl std::error::Error for RpcError {}
