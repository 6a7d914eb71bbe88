//! Generic schema-enforcing channel.

use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::messages::{ErrorReport, Message};
use super::payload::{encode_batch, into_records, parse_payload};
use super::topic::Topic;
use crate::transport::{Envelope, Handler, SubscriptionId, Transport, TransportError};
use crate::validator::ValidationError;

/// Errors returned to local callers of [`Channel::send`].
///
/// Rejections are also reported on `map.error`; the return value only lets
/// Rust callers react without subscribing to the error topic.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// One or more records violated the topic schema; nothing was published
    #[error("Rejected message on {topic}: {description}")]
    Rejected { topic: Topic, description: String },

    /// A record could not be serialized
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    /// The transport refused the message
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Handle for a subscription made with [`Channel::add_handler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    topic: Topic,
    id: SubscriptionId,
}

impl Subscription {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// One protocol topic, enforcing the schema of `M` in both directions.
///
/// # Example
///
/// ```
/// use cmwapi::channel::{Channel, OverlayCreate, Topic};
/// use cmwapi::transport::InMemoryBus;
///
/// let bus = InMemoryBus::new();
/// let channel = Channel::<OverlayCreate>::new(bus.connect("w"), Topic::OverlayCreate);
///
/// channel.send_one(OverlayCreate::new("tracks")).unwrap();
/// assert_eq!(bus.published_on("map.overlay.create").len(), 1);
/// ```
pub struct Channel<M> {
    topic: Topic,
    transport: Arc<dyn Transport>,
    _schema: PhantomData<fn() -> M>,
}

impl<M> Clone for Channel<M> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic,
            transport: Arc::clone(&self.transport),
            _schema: PhantomData,
        }
    }
}

impl<M: Message> Channel<M> {
    /// Create a channel for `topic` on `transport`.
    pub fn new(transport: Arc<dyn Transport>, topic: Topic) -> Self {
        Self {
            topic,
            transport,
            _schema: PhantomData,
        }
    }

    /// The topic this channel publishes and subscribes on.
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Send a single record.
    pub fn send_one(&self, record: M) -> Result<(), ChannelError> {
        self.send(vec![record])
    }

    /// Validate, default and publish a batch of records.
    ///
    /// All-or-nothing: if any record is invalid nothing is published on the
    /// topic and one aggregated report goes to `map.error`.
    pub fn send(&self, records: Vec<M>) -> Result<(), ChannelError> {
        let sender = self.transport.sender_id().to_string();
        let original = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        match normalize(records, &sender) {
            Ok(records) => {
                let values = records
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<Vec<_>, _>>()?;
                let count = values.len();
                self.transport
                    .publish(self.topic.as_str(), encode_batch(values))?;
                debug!(topic = %self.topic, count, "Published");
                Ok(())
            }
            Err(description) => {
                report_rejection(
                    self.transport.as_ref(),
                    self.topic,
                    encode_batch(original),
                    &description,
                );
                Err(ChannelError::Rejected {
                    topic: self.topic,
                    description,
                })
            }
        }
    }

    /// Subscribe `handler` to the topic.
    ///
    /// The handler receives the sender identity and the validated, defaulted
    /// records. It is never called with a partially valid batch: one bad
    /// record rejects the whole message and reports it on `map.error`.
    pub fn add_handler<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&str, Vec<M>) + Send + Sync + 'static,
    {
        let topic = self.topic;
        let transport: Weak<dyn Transport> = Arc::downgrade(&self.transport);

        let dispatcher: Handler = Arc::new(move |envelope: &Envelope| {
            match decode::<M>(&envelope.payload, &envelope.sender) {
                Ok(records) => handler(envelope.sender.as_str(), records),
                Err((body, description)) => {
                    warn!(
                        topic = %topic,
                        sender = %envelope.sender,
                        error = %description,
                        "Dropping invalid message"
                    );
                    if let Some(transport) = transport.upgrade() {
                        report_rejection(transport.as_ref(), topic, body, &description);
                    }
                }
            }
        });

        let id = self.transport.subscribe(topic.as_str(), dispatcher);
        Subscription { topic, id }
    }

    /// Unsubscribe every handler added on this topic through this transport.
    pub fn remove_handlers(&self) {
        self.transport.unsubscribe(self.topic.as_str());
    }
}

/// Apply defaults and validate each record, collecting every violation.
fn normalize<M: Message>(mut records: Vec<M>, sender: &str) -> Result<Vec<M>, String> {
    if records.is_empty() {
        return Err("message contains no records".to_string());
    }

    let batch = records.len() > 1;
    let mut problems = Vec::new();
    for (index, record) in records.iter_mut().enumerate() {
        record.apply_defaults(sender);
        for violation in record.validate() {
            problems.push(describe(index, batch, &violation));
        }
    }

    if problems.is_empty() {
        Ok(records)
    } else {
        Err(problems.join("; "))
    }
}

/// Decode a transport payload into normalized records.
///
/// On failure returns the best structured form of the body (for the error
/// report) together with the description of every violation.
fn decode<M: Message>(payload: &Value, sender: &str) -> Result<Vec<M>, (Value, String)> {
    let body = parse_payload(payload).map_err(|e| (payload.clone(), e.to_string()))?;
    let values = into_records(body.clone());
    let batch = values.len() > 1;

    let mut records = Vec::with_capacity(values.len());
    let mut problems = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<M>(value) {
            Ok(record) => records.push(record),
            Err(e) => problems.push(describe(
                index,
                batch,
                &ValidationError::Malformed(e.to_string()),
            )),
        }
    }
    if !problems.is_empty() {
        return Err((body, problems.join("; ")));
    }

    normalize(records, sender).map_err(|description| (body, description))
}

fn describe(index: usize, batch: bool, violation: &ValidationError) -> String {
    if batch {
        format!("record {}: {}", index, violation)
    } else {
        violation.to_string()
    }
}

/// Publish an aggregated rejection on `map.error`.
///
/// Rejections of `map.error` traffic itself are only logged.
pub(crate) fn report_rejection(
    transport: &dyn Transport,
    topic: Topic,
    payload: Value,
    description: &str,
) {
    if topic == Topic::Error {
        warn!(error = %description, "Invalid error report dropped");
        return;
    }

    let mut report = ErrorReport::new(topic.as_str(), payload, description);
    report.apply_defaults(transport.sender_id());

    let published = serde_json::to_value(&report)
        .map_err(ChannelError::from)
        .and_then(|body| {
            transport
                .publish(Topic::Error.as_str(), body)
                .map_err(ChannelError::from)
        });
    if let Err(e) = published {
        warn!(topic = %topic, error = %e, "Failed to publish error report");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::messages::{FeatureTarget, OverlayCreate};
    use crate::transport::InMemoryBus;
    use parking_lot::Mutex;
    use serde_json::json;

    type Received<M> = Arc<Mutex<Vec<(String, Vec<M>)>>>;

    fn recording_handler<M: Message>(
        channel: &Channel<M>,
    ) -> Received<M> {
        let received: Received<M> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        channel.add_handler(move |sender: &str, records: Vec<M>| {
            sink.lock().push((sender.to_string(), records));
        });
        received
    }

    #[test]
    fn test_send_single_record_publishes_defaulted_record() {
        let bus = InMemoryBus::new();
        let channel = Channel::<OverlayCreate>::new(bus.connect("w1"), Topic::OverlayCreate);

        channel.send_one(OverlayCreate::default()).unwrap();

        let published = bus.published_on("map.overlay.create");
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].payload,
            json!({"overlayId": "w1", "name": "w1"})
        );
        assert!(bus.published_on("map.error").is_empty());
    }

    #[test]
    fn test_send_batch_publishes_array_in_order() {
        let bus = InMemoryBus::new();
        let channel = Channel::<OverlayCreate>::new(bus.connect("w1"), Topic::OverlayCreate);

        channel
            .send(vec![OverlayCreate::new("a"), OverlayCreate::default()])
            .unwrap();

        let published = bus.published_on("map.overlay.create");
        assert_eq!(
            published[0].payload,
            json!([
                {"overlayId": "a", "name": "a"},
                {"overlayId": "w1", "name": "w1"}
            ])
        );
    }

    #[test]
    fn test_send_invalid_batch_publishes_only_error() {
        let bus = InMemoryBus::new();
        let channel = Channel::<FeatureTarget>::new(bus.connect("w1"), Topic::FeatureHide);

        let result = channel.send(vec![
            FeatureTarget::new("o", "f"),
            FeatureTarget::default(),
        ]);

        assert!(matches!(result, Err(ChannelError::Rejected { .. })));
        assert!(bus.published_on("map.feature.hide").is_empty());

        let errors = bus.published_on("map.error");
        assert_eq!(errors.len(), 1);
        let report = &errors[0].payload;
        assert_eq!(report["type"], "map.feature.hide");
        assert_eq!(report["sender"], "w1");
        assert_eq!(report["msg"].as_array().unwrap().len(), 2);
        assert_eq!(
            report["error"],
            "record 1: missing required field 'featureId'"
        );
    }

    #[test]
    fn test_handler_receives_defaults_from_sender() {
        let bus = InMemoryBus::new();
        let map = Channel::<FeatureTarget>::new(bus.connect("map"), Topic::FeatureShow);
        let received = recording_handler(&map);

        let other = bus.connect("other");
        other
            .publish("map.feature.show", json!({"featureId": "f1"}))
            .unwrap();

        let received = received.lock();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "other");
        assert_eq!(received[0].1[0].overlay_id(), "other");
    }

    #[test]
    fn test_handler_not_called_for_partially_valid_batch() {
        let bus = InMemoryBus::new();
        let map = Channel::<FeatureTarget>::new(bus.connect("map"), Topic::FeatureShow);
        let received = recording_handler(&map);

        let other = bus.connect("other");
        other
            .publish(
                "map.feature.show",
                json!([{"featureId": "f1"}, {"overlayId": "o"}]),
            )
            .unwrap();

        assert!(received.lock().is_empty());
        let errors = bus.published_on("map.error");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].sender, "map");
    }

    #[test]
    fn test_handler_reports_type_mismatch() {
        let bus = InMemoryBus::new();
        let map = Channel::<FeatureTarget>::new(bus.connect("map"), Topic::FeatureShow);
        let received = recording_handler(&map);

        bus.connect("other")
            .publish("map.feature.show", json!({"featureId": 42}))
            .unwrap();

        assert!(received.lock().is_empty());
        let errors = bus.published_on("map.error");
        assert!(errors[0].payload["error"]
            .as_str()
            .unwrap()
            .starts_with("malformed record"));
    }

    #[test]
    fn test_remove_handlers_stops_delivery() {
        let bus = InMemoryBus::new();
        let map = Channel::<FeatureTarget>::new(bus.connect("map"), Topic::FeatureShow);
        let first = recording_handler(&map);
        let second = recording_handler(&map);

        let other = bus.connect("other");
        other
            .publish("map.feature.show", json!({"featureId": "f1"}))
            .unwrap();
        map.remove_handlers();
        other
            .publish("map.feature.show", json!({"featureId": "f2"}))
            .unwrap();

        assert_eq!(first.lock().len(), 1);
        assert_eq!(second.lock().len(), 1);
    }

    #[test]
    fn test_invalid_error_report_is_not_reported_again() {
        let bus = InMemoryBus::new();
        let errors = Channel::<ErrorReport>::new(bus.connect("map"), Topic::Error);

        assert!(errors.send_one(ErrorReport::default()).is_err());
        assert!(bus.published().is_empty());
    }
}
