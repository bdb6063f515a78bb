//! Common fixtures for sockrpc-server integration tests
//!
//! Message types used across the suites, plus a tracing layer that counts
//! emitted events so tests can observe logging side effects.

#![allow(dead_code)]

use serde::ser::{Error as _, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use sockrpc_core::{AnyMessage, Message};
use sockrpc_macros::Message;
use sockrpc_server::IntoMessage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Message)]
#[message(package = "greeter")]
pub struct Greeting {
    pub text: String,
}

impl Greeting {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Message)]
#[message(package = "greeter")]
pub struct Farewell {
    pub text: String,
}

/// Message whose serialization always fails
#[derive(Debug, Deserialize, Message)]
#[message(name = "greeter.Exploding")]
pub struct Exploding {
    pub reason: String,
}

impl Serialize for Exploding {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom(format!("cannot encode: {}", self.reason)))
    }
}

/// Message counting how often it is serialized
#[derive(Debug, Deserialize, Message)]
#[message(package = "greeter")]
pub struct Counted {
    pub text: String,
    #[serde(skip)]
    pub encodes: Arc<AtomicUsize>,
}

impl Serialize for Counted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encodes.fetch_add(1, Ordering::SeqCst);
        let mut state = serializer.serialize_struct("Counted", 1)?;
        state.serialize_field("text", &self.text)?;
        state.end()
    }
}

/// Domain value that knows how to become a `Greeting`
#[derive(Debug)]
pub struct Visitor {
    pub name: String,
}

impl IntoMessage for Visitor {
    fn to_message(&self) -> Box<dyn AnyMessage> {
        Box::new(Greeting::new(format!("hello {}", self.name)))
    }
}

/// Domain value that converts to the wrong message type
#[derive(Debug)]
pub struct Leaver;

impl IntoMessage for Leaver {
    fn to_message(&self) -> Box<dyn AnyMessage> {
        Box::new(Farewell {
            text: "bye".to_string(),
        })
    }
}

/// Events seen by a `CountingLayer`
#[derive(Debug, Default, Clone)]
pub struct EventCounts {
    total: Arc<AtomicUsize>,
    errors: Arc<AtomicUsize>,
}

impl EventCounts {
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }
}

struct CountingLayer {
    counts: EventCounts,
}

impl<S: Subscriber> Layer<S> for CountingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.counts.total.fetch_add(1, Ordering::SeqCst);
        if *event.metadata().level() == Level::ERROR {
            self.counts.errors.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` with a thread-local subscriber that counts every event
pub fn count_events<R>(f: impl FnOnce() -> R) -> (R, EventCounts) {
    let counts = EventCounts::default();
    let subscriber = tracing_subscriber::registry().with(CountingLayer {
        counts: counts.clone(),
    });
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, counts)
}

/// Schema name helper for assertions
pub fn name_of<M: Message>() -> &'static str {
    M::NAME
}
