//! Publish/subscribe transport abstraction.
//!
//! The host dashboard owns the real transport: it delivers serialized
//! messages between widgets and stamps each one with the sender's identity.
//! Channels only ever talk to it through the [`Transport`] trait.
//!
//! - [`Transport`] - publish, subscribe, unsubscribe and local identity
//! - [`InMemoryBus`] - in-process bus connecting any number of endpoints
//!
//! Delivery is fire-and-forget. There is no acknowledgement, retry or
//! ordering guarantee beyond "in publish order" for the in-memory bus.

mod memory;

pub use memory::{BusEndpoint, InMemoryBus};

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// A message as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Identity of the publishing widget
    pub sender: String,
    /// Topic name the message was published on
    pub topic: String,
    /// Body; either structured JSON or a JSON-encoded string
    pub payload: Value,
}

/// Callback invoked for every message on a subscribed topic.
pub type Handler = Arc<dyn Fn(&Envelope) + Send + Sync>;

/// Identifies one subscription made through a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Errors raised by a transport when publishing.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint has been closed and can no longer publish
    #[error("Transport endpoint '{0}' is disconnected")]
    Disconnected(String),

    /// The host rejected the message
    #[error("Failed to deliver message on '{topic}': {reason}")]
    Delivery { topic: String, reason: String },
}

/// Host publish/subscribe transport.
///
/// Implementations must be `Send + Sync` so channels can be shared between
/// the components of a widget.
pub trait Transport: Send + Sync {
    /// Identity of the local widget; used as the default `overlayId` and as
    /// the `sender` of error reports.
    fn sender_id(&self) -> &str;

    /// Publish `payload` on `topic`.
    fn publish(&self, topic: &str, payload: Value) -> Result<(), TransportError>;

    /// Subscribe `handler` to `topic`.
    fn subscribe(&self, topic: &str, handler: Handler) -> SubscriptionId;

    /// Drop every subscription this endpoint holds on `topic`.
    fn unsubscribe(&self, topic: &str);
}
