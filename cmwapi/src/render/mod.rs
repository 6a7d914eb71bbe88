//! Render engine collaborator
//!
//! The registry never draws anything itself. It asks a [`RenderEngine`] to
//! build a layer for each plotted feature and keeps the returned
//! [`LayerHandle`] for as long as the feature exists.
//!
//! Layer construction is asynchronous: the engine receives a [`LoadSignal`]
//! with every request and completes it once the layer has loaded. Completion
//! is a message on a tokio channel which the registry drains with
//! `Registry::process_load_events`.
//!
//! [`MemoryRenderEngine`] is a headless implementation that records every
//! call, used by tests and by hosts without a real map.

mod memory;

pub use memory::{MemoryLayer, MemoryRenderEngine};

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::coord::LatLon;
use crate::extent::{Extent, LayerShape};
use crate::registry::FeatureFormat;

/// Engine-assigned layer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer-{}", self.0)
    }
}

/// Exclusive ownership of one engine layer.
///
/// Not `Clone`: a handle is owned by exactly one feature and given back to
/// the engine through [`RenderEngine::remove_layer`].
#[derive(Debug, PartialEq, Eq)]
pub struct LayerHandle {
    id: LayerId,
}

impl LayerHandle {
    pub fn new(id: LayerId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }
}

/// Where a layer's content comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource {
    Inline { data: Value },
    Url {
        url: String,
        params: Option<Map<String, Value>>,
    },
}

/// A request to build a layer for a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRequest {
    pub name: String,
    pub format: FeatureFormat,
    pub source: LayerSource,
}

/// A layer finished loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadEvent {
    pub overlay_id: String,
    pub feature_id: String,
    pub layer: LayerId,
}

/// Completion signal handed to the engine with each layer request.
#[derive(Debug)]
pub struct LoadSignal {
    tx: mpsc::UnboundedSender<LoadEvent>,
    overlay_id: String,
    feature_id: String,
}

impl LoadSignal {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<LoadEvent>,
        overlay_id: impl Into<String>,
        feature_id: impl Into<String>,
    ) -> Self {
        Self {
            tx,
            overlay_id: overlay_id.into(),
            feature_id: feature_id.into(),
        }
    }

    /// The feature this signal belongs to, as `(overlay_id, feature_id)`.
    pub fn feature(&self) -> (&str, &str) {
        (&self.overlay_id, &self.feature_id)
    }

    /// Report that `layer` has loaded.
    ///
    /// Completing after the registry has gone away is not an error.
    pub fn complete(self, layer: LayerId) {
        let _ = self.tx.send(LoadEvent {
            overlay_id: self.overlay_id,
            feature_id: self.feature_id,
            layer,
        });
    }
}

/// Render engine failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The engine could not build a layer
    #[error("Layer '{name}' rejected: {reason}")]
    LayerRejected { name: String, reason: String },

    /// The engine has no support for this source
    #[error("Unsupported layer source for format {0}")]
    UnsupportedSource(String),
}

/// Operations the registry and adapter need from a map engine.
pub trait RenderEngine: Send {
    /// Start building a layer. `loaded` must be completed once it has loaded.
    fn add_layer(
        &mut self,
        request: LayerRequest,
        loaded: LoadSignal,
    ) -> Result<LayerHandle, RenderError>;

    /// Destroy a layer.
    fn remove_layer(&mut self, handle: LayerHandle);

    fn hide_layer(&mut self, handle: &LayerHandle);

    fn show_layer(&mut self, handle: &LayerHandle);

    /// Current shape of a layer, `None` if the engine does not know it.
    fn layer_shape(&self, handle: &LayerHandle) -> Option<LayerShape>;

    /// Currently visible region.
    fn extent(&self) -> Extent;

    /// Reframe the camera onto `extent`.
    fn set_extent(&mut self, extent: Extent);

    /// Current map scale.
    fn scale(&self) -> f64;

    fn set_scale(&mut self, scale: f64);

    /// Pan the camera so `center` is in the middle of the view.
    fn center_at(&mut self, center: LatLon);

    /// Width of the map view in pixels.
    fn view_width_pixels(&self) -> f64;
}
