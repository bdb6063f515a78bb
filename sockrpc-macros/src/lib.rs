//! Procedural macros for sockrpc
//!
//! # `#[derive(Message)]`
//!
//! Implements `sockrpc_core::Message` for a struct, giving it a schema name.
//! The struct must also derive serde's `Serialize` and `Deserialize` and
//! implement `Debug`; the derive only attaches the name.
//!
//! By default the schema name is the struct's identifier. Use
//! `#[message(name = "...")]` to set a fully-qualified name, or
//! `#[message(package = "...")]` to prefix the identifier with a package.
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//! use sockrpc_macros::Message;
//!
//! #[derive(Debug, Serialize, Deserialize, Message)]
//! #[message(package = "greeter")]
//! struct Greeting {
//!     text: String,
//! }
//!
//! assert_eq!(<Greeting as sockrpc_core::Message>::NAME, "greeter.Greeting");
//! ```

mod message;

use proc_macro::TokenStream;

/// Derive `sockrpc_core::Message`
///
/// # Attributes
///
/// - `#[message(name = "pkg.Type")]`: use this exact schema name
/// - `#[message(package = "pkg")]`: schema name is `pkg.<Ident>`
///
/// Setting both is an error.
#[proc_macro_derive(Message, attributes(message))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    message::derive_message_impl(input)
}
