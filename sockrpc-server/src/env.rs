//! Per-call context
//!
//! An `Env` is created when a request arrives and travels through the
//! middleware chain until its encoded response is handed to the transport.
//! It is owned by whichever worker processes the call; nothing in it is
//! shared between calls.
//!
//! # Slots
//!
//! - `response`: the candidate the handler produced
//! - `response_type`: the schema the call declared for its response
//! - `validated_response`: filled once by the response encoder
//! - `encoded_response`: the serialized envelope, filled once by the encoder

use crate::candidate::Candidate;
use serde_json::Value;
use sockrpc_core::{AnyMessage, Message, ResponseType, RpcError};
use std::collections::HashMap;

/// A response that passed normalization
///
/// Either a typed message matching the call's response type, or an error
/// value. Nothing else can reach the envelope.
#[derive(Debug)]
pub enum ValidatedResponse {
    Message(Box<dyn AnyMessage>),
    Error(RpcError),
}

impl ValidatedResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ValidatedResponse::Error(_))
    }

    /// Borrow the message as `T` if this is a `T` message
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        match self {
            ValidatedResponse::Message(message) => message.downcast_ref::<T>(),
            ValidatedResponse::Error(_) => None,
        }
    }

    pub fn as_error(&self) -> Option<&RpcError> {
        match self {
            ValidatedResponse::Error(error) => Some(error),
            ValidatedResponse::Message(_) => None,
        }
    }
}

/// Context of a single RPC call
#[derive(Debug, Default)]
pub struct Env {
    /// Service the call targets
    pub service_name: String,
    /// Method the call targets
    pub method_name: String,
    /// Free-form identity of the client (host, peer address, ...)
    pub caller: Option<String>,
    /// Request ID for correlation
    pub request_id: Option<u64>,
    /// Prefix that distinguishes this call's log lines
    pub log_signature: Option<String>,
    /// Candidate produced by the handler chain
    pub response: Option<Candidate>,
    /// Declared response schema
    pub response_type: Option<ResponseType>,
    /// Normalized response
    pub validated_response: Option<ValidatedResponse>,
    /// Serialized response envelope, ready for the transport
    pub encoded_response: Option<Vec<u8>>,
    /// Data passed between middleware
    pub metadata: HashMap<String, Value>,
}

impl Env {
    pub fn new(service_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            method_name: method_name.into(),
            ..Default::default()
        }
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    pub fn with_response(mut self, response: Candidate) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_log_signature(mut self, signature: impl Into<String>) -> Self {
        self.log_signature = Some(signature.into());
        self
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    pub fn with_request_id(mut self, request_id: u64) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// "Service#method", as used in logs
    pub fn rpc_name(&self) -> String {
        format!("{}#{}", self.service_name, self.method_name)
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}
