//! Map widget adapter
//!
//! Binds the inbound protocol channels to a [`Registry`] and its render
//! engine, so a widget reacts to messages from the rest of the dashboard:
//!
//! ```text
//! map.overlay.*  ──► overlay handlers ──┐
//! map.feature.*  ──► feature handlers ──┼──► Registry ──► RenderEngine
//! map.view.*     ──► view handlers    ──┘         │
//! map.status.request ──► status handlers          └──► map.error on failure
//!                          │
//!                          └──► map.status.{view,about,format,selected}
//! ```
//!
//! Handlers take the registry lock, apply the request, release the lock and
//! only then publish replies or error reports.

mod feature;
mod overlay;
mod status;
mod view;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::channel::{ChannelSet, ErrorReport, Topic};
use crate::config::{ConfigFile, WidgetSettings};
use crate::registry::{Registry, RegistryError};
use crate::render::RenderEngine;
use crate::transport::Transport;

/// State shared by every handler of one adapter.
struct Context<E: RenderEngine> {
    registry: Arc<Mutex<Registry<E>>>,
    channels: ChannelSet,
    about: WidgetSettings,
}

impl<E: RenderEngine> Context<E> {
    /// Run `op` under the registry lock and report any failure on `map.error`.
    fn apply<M, F>(&self, topic: Topic, record: &M, op: F)
    where
        M: Serialize,
        F: FnOnce(&mut Registry<E>) -> Result<(), RegistryError>,
    {
        let result = {
            let mut registry = self.registry.lock();
            op(&mut *registry)
        };
        if let Err(e) = result {
            self.report(topic, record, &e);
        }
    }

    fn report<M: Serialize>(&self, topic: Topic, record: &M, err: &RegistryError) {
        warn!(topic = %topic, kind = err.kind(), error = %err, "Request failed");
        let msg = serde_json::to_value(record).unwrap_or(Value::Null);
        let report = ErrorReport::new(topic.as_str(), msg, format!("{}: {}", err.kind(), err));
        if let Err(e) = self.channels.error.send_one(report) {
            warn!(topic = %topic, error = %e, "Failed to report error");
        }
    }
}

/// Connects one widget's registry to the message channels.
///
/// # Example
///
/// ```
/// use cmwapi::adapter::MapAdapter;
/// use cmwapi::config::ConfigFile;
/// use cmwapi::render::MemoryRenderEngine;
/// use cmwapi::transport::{InMemoryBus, Transport};
/// use serde_json::json;
///
/// let bus = InMemoryBus::new();
/// let adapter = MapAdapter::from_config(bus.connect("map"), MemoryRenderEngine::new(), &ConfigFile::default());
/// adapter.attach();
///
/// bus.connect("planner")
///     .publish("map.overlay.create", json!({"overlayId": "routes"}))
///     .unwrap();
///
/// assert!(adapter.registry().lock().overlay("routes").is_some());
/// ```
pub struct MapAdapter<E: RenderEngine + 'static> {
    context: Arc<Context<E>>,
}

impl<E: RenderEngine + 'static> MapAdapter<E> {
    pub fn new(transport: Arc<dyn Transport>, registry: Registry<E>, about: WidgetSettings) -> Self {
        Self {
            context: Arc::new(Context {
                registry: Arc::new(Mutex::new(registry)),
                channels: ChannelSet::new(transport),
                about,
            }),
        }
    }

    /// Build the registry and widget identity from configuration.
    pub fn from_config(transport: Arc<dyn Transport>, engine: E, config: &ConfigFile) -> Self {
        let registry = Registry::with_event_capacity(engine, config.registry.event_capacity);
        Self::new(transport, registry, config.widget.clone())
    }

    /// Shared handle to the registry.
    pub fn registry(&self) -> Arc<Mutex<Registry<E>>> {
        Arc::clone(&self.context.registry)
    }

    /// Outbound channels, bound to this widget's transport.
    pub fn channels(&self) -> &ChannelSet {
        &self.context.channels
    }

    /// Subscribe to every inbound topic.
    pub fn attach(&self) {
        overlay::attach(&self.context);
        feature::attach(&self.context);
        view::attach(&self.context);
        status::attach(&self.context);
        info!(widget = %self.context.channels.sender_id(), "Adapter attached");
    }

    /// Unsubscribe from every topic.
    pub fn detach(&self) {
        self.context.channels.remove_all_handlers();
        info!(widget = %self.context.channels.sender_id(), "Adapter detached");
    }

    /// Handle layers that finished loading since the last call.
    pub fn process_load_events(&self) -> usize {
        self.context.registry.lock().process_load_events()
    }
}
