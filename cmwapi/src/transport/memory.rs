//! In-process transport connecting widgets through a shared bus.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::trace;

use super::{Envelope, Handler, SubscriptionId, Transport, TransportError};

struct Subscriber {
    endpoint: String,
    handler: Handler,
}

struct BusInner {
    subscribers: RwLock<HashMap<String, Vec<Subscriber>>>,
    history: Mutex<Vec<Envelope>>,
    next_id: AtomicU64,
    string_payloads: bool,
}

/// In-memory publish/subscribe bus.
///
/// Every endpoint obtained from [`InMemoryBus::connect`] sees every message
/// published on topics it subscribes to, including its own. Handlers run
/// synchronously inside `publish`, after the bus has released its locks, so a
/// handler may itself publish.
///
/// # Example
///
/// ```
/// use cmwapi::transport::{InMemoryBus, Transport};
/// use serde_json::json;
///
/// let bus = InMemoryBus::new();
/// let map = bus.connect("map-widget");
/// map.publish("map.overlay.create", json!({"overlayId": "tracks"})).unwrap();
///
/// assert_eq!(bus.published_on("map.overlay.create").len(), 1);
/// ```
#[derive(Clone)]
pub struct InMemoryBus {
    inner: Arc<BusInner>,
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBus {
    /// Create a bus that delivers payloads as structured JSON.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Create a bus that delivers every payload as a JSON-encoded string,
    /// the way browser dashboards hand messages between frames.
    pub fn with_string_payloads() -> Self {
        Self::build(true)
    }

    fn build(string_payloads: bool) -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: RwLock::new(HashMap::new()),
                history: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                string_payloads,
            }),
        }
    }

    /// Connect a widget to the bus under the given identity.
    pub fn connect(&self, widget_id: impl Into<String>) -> Arc<BusEndpoint> {
        Arc::new(BusEndpoint {
            bus: self.clone(),
            id: widget_id.into(),
            closed: AtomicBool::new(false),
        })
    }

    /// Every message delivered so far, in publish order.
    pub fn published(&self) -> Vec<Envelope> {
        self.inner.history.lock().clone()
    }

    /// Messages delivered on one topic, in publish order.
    pub fn published_on(&self, topic: &str) -> Vec<Envelope> {
        self.inner
            .history
            .lock()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Forget the delivery history.
    pub fn clear_history(&self) {
        self.inner.history.lock().clear();
    }

    /// Number of live subscriptions on a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .subscribers
            .read()
            .get(topic)
            .map_or(0, |subs| subs.len())
    }

    fn deliver(&self, envelope: Envelope) {
        self.inner.history.lock().push(envelope.clone());

        // Snapshot handlers so none run while the subscriber table is locked
        let handlers: Vec<Handler> = self
            .inner
            .subscribers
            .read()
            .get(&envelope.topic)
            .map(|subs| subs.iter().map(|s| Arc::clone(&s.handler)).collect())
            .unwrap_or_default();

        trace!(
            topic = %envelope.topic,
            sender = %envelope.sender,
            handlers = handlers.len(),
            "Delivering message"
        );

        for handler in handlers {
            handler(&envelope);
        }
    }
}

/// One widget's connection to an [`InMemoryBus`].
pub struct BusEndpoint {
    bus: InMemoryBus,
    id: String,
    closed: AtomicBool,
}

impl BusEndpoint {
    /// Disconnect: drops all subscriptions and rejects further publishes.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut subscribers = self.bus.inner.subscribers.write();
        for subs in subscribers.values_mut() {
            subs.retain(|s| s.endpoint != self.id);
        }
    }
}

impl Transport for BusEndpoint {
    fn sender_id(&self) -> &str {
        &self.id
    }

    fn publish(&self, topic: &str, payload: Value) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected(self.id.clone()));
        }

        let payload = if self.bus.inner.string_payloads {
            Value::String(payload.to_string())
        } else {
            payload
        };

        self.bus.deliver(Envelope {
            sender: self.id.clone(),
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }

    fn subscribe(&self, topic: &str, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.bus.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.bus
            .inner
            .subscribers
            .write()
            .entry(topic.to_string())
            .or_default()
            .push(Subscriber {
                endpoint: self.id.clone(),
                handler,
            });
        trace!(topic, endpoint = %self.id, subscription = id.0, "Subscribed");
        id
    }

    fn unsubscribe(&self, topic: &str) {
        if let Some(subs) = self.bus.inner.subscribers.write().get_mut(topic) {
            subs.retain(|s| s.endpoint != self.id);
        }
        trace!(topic, endpoint = %self.id, "Unsubscribed");
    }
}
