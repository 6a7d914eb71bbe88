//! Headless render engine.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, trace};

use super::{
    LayerHandle, LayerId, LayerRequest, LayerSource, LoadSignal, RenderEngine, RenderError,
};
use crate::coord::{Bounds, LatLon};
use crate::extent::{union_extents, zoom_altitude_to_scale, Extent, LayerShape};
use crate::registry::FeatureFormat;

/// Default view width in pixels.
pub const DEFAULT_VIEW_WIDTH: f64 = 1024.0;

/// Camera altitude the engine starts at, in meters.
const INITIAL_ALTITUDE: f64 = 1.0e7;

/// A layer held by [`MemoryRenderEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryLayer {
    pub request: LayerRequest,
    pub visible: bool,
    pub loaded: bool,
}

/// Render engine that keeps layers and camera state in memory.
///
/// Layer shapes come from URLs registered with [`set_layer_shape`]
/// or, for inline GeoJSON, from the coordinates in the data itself.
/// Anything else has an unknown extent.
///
/// By default layers load immediately. An engine built with
/// [`MemoryRenderEngine::deferred`] holds load signals until
/// [`complete_pending`] is called.
///
/// Extent and scale are tracked independently; the engine does not derive
/// one from the other.
///
/// [`set_layer_shape`]: MemoryRenderEngine::set_layer_shape
/// [`complete_pending`]: MemoryRenderEngine::complete_pending
#[derive(Debug)]
pub struct MemoryRenderEngine {
    next_id: u64,
    layers: BTreeMap<LayerId, MemoryLayer>,
    shapes: HashMap<String, LayerShape>,
    rejected_urls: HashSet<String>,
    auto_complete: bool,
    pending: Vec<(LayerId, LoadSignal)>,
    removed: Vec<LayerId>,
    extent: Extent,
    scale: f64,
    view_width: f64,
}

impl Default for MemoryRenderEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRenderEngine {
    /// Engine whose layers load as soon as they are added.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            layers: BTreeMap::new(),
            shapes: HashMap::new(),
            rejected_urls: HashSet::new(),
            auto_complete: true,
            pending: Vec::new(),
            removed: Vec::new(),
            extent: Bounds::from_edges(-90.0, -180.0, 90.0, 180.0),
            scale: zoom_altitude_to_scale(DEFAULT_VIEW_WIDTH, INITIAL_ALTITUDE),
            view_width: DEFAULT_VIEW_WIDTH,
        }
    }

    /// Engine whose layers load only when [`complete_pending`](Self::complete_pending) runs.
    pub fn deferred() -> Self {
        Self {
            auto_complete: false,
            ..Self::new()
        }
    }

    pub fn with_view_width(mut self, pixels: f64) -> Self {
        self.view_width = pixels;
        self
    }

    /// Shape reported for layers loaded from `url`.
    pub fn set_layer_shape(&mut self, url: impl Into<String>, shape: LayerShape) {
        self.shapes.insert(url.into(), shape);
    }

    /// Refuse to build layers from `url`.
    pub fn reject_url(&mut self, url: impl Into<String>) {
        self.rejected_urls.insert(url.into());
    }

    /// Complete every held load signal, returning how many were completed.
    ///
    /// Signals for layers removed in the meantime are still completed; the
    /// registry decides whether they matter.
    pub fn complete_pending(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for (id, signal) in pending {
            if let Some(layer) = self.layers.get_mut(&id) {
                layer.loaded = true;
            }
            signal.complete(id);
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn layer(&self, id: LayerId) -> Option<&MemoryLayer> {
        self.layers.get(&id)
    }

    /// Number of live layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn is_visible(&self, id: LayerId) -> bool {
        self.layers.get(&id).map(|l| l.visible).unwrap_or(false)
    }

    /// Layers destroyed so far, in removal order.
    pub fn removed_layers(&self) -> &[LayerId] {
        &self.removed
    }

    fn shape_of(&self, request: &LayerRequest) -> LayerShape {
        match &request.source {
            LayerSource::Url { url, .. } => self
                .shapes
                .get(url)
                .cloned()
                .unwrap_or(LayerShape::Single(None)),
            LayerSource::Inline { data } if request.format == FeatureFormat::GeoJson => {
                LayerShape::Single(geojson_extent(data))
            }
            LayerSource::Inline { .. } => LayerShape::Single(None),
        }
    }
}

impl RenderEngine for MemoryRenderEngine {
    fn add_layer(
        &mut self,
        request: LayerRequest,
        loaded: LoadSignal,
    ) -> Result<LayerHandle, RenderError> {
        if let LayerSource::Url { url, .. } = &request.source {
            if self.rejected_urls.contains(url) {
                return Err(RenderError::LayerRejected {
                    name: request.name,
                    reason: format!("cannot load {}", url),
                });
            }
        }

        let id = LayerId(self.next_id);
        self.next_id += 1;
        debug!(layer = %id, name = %request.name, format = %request.format, "Layer added");

        self.layers.insert(
            id,
            MemoryLayer {
                request,
                visible: true,
                loaded: self.auto_complete,
            },
        );
        if self.auto_complete {
            loaded.complete(id);
        } else {
            self.pending.push((id, loaded));
        }
        Ok(LayerHandle::new(id))
    }

    fn remove_layer(&mut self, handle: LayerHandle) {
        if self.layers.remove(&handle.id()).is_some() {
            trace!(layer = %handle.id(), "Layer removed");
            self.removed.push(handle.id());
        }
    }

    fn hide_layer(&mut self, handle: &LayerHandle) {
        if let Some(layer) = self.layers.get_mut(&handle.id()) {
            layer.visible = false;
        }
    }

    fn show_layer(&mut self, handle: &LayerHandle) {
        if let Some(layer) = self.layers.get_mut(&handle.id()) {
            layer.visible = true;
        }
    }

    fn layer_shape(&self, handle: &LayerHandle) -> Option<LayerShape> {
        self.layers
            .get(&handle.id())
            .map(|layer| self.shape_of(&layer.request))
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    fn set_extent(&mut self, extent: Extent) {
        self.extent = extent;
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn center_at(&mut self, center: LatLon) {
        self.extent = self.extent.recentered(center).clamped();
    }

    fn view_width_pixels(&self) -> f64 {
        self.view_width
    }
}

/// Bounding box of every position in a GeoJSON object.
///
/// Accepts the object itself or its JSON text.
fn geojson_extent(data: &Value) -> Option<Extent> {
    match data {
        Value::String(text) => serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|value| geojson_extent(&value)),
        Value::Object(object) => {
            let mut extent = object.get("coordinates").and_then(positions_extent);
            for key in ["geometry", "geometries", "features"] {
                if let Some(nested) = object.get(key) {
                    extent = union_extents(extent, geojson_extent(nested));
                }
            }
            extent
        }
        Value::Array(items) => items
            .iter()
            .fold(None, |acc, item| union_extents(acc, geojson_extent(item))),
        _ => None,
    }
}

/// Bounding box of a (possibly nested) GeoJSON coordinate array.
fn positions_extent(coordinates: &Value) -> Option<Extent> {
    let items = coordinates.as_array()?;
    match (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        (Some(lon), Some(lat)) => Some(Bounds::from_edges(lat, lon, lat, lon)),
        _ => items
            .iter()
            .fold(None, |acc, item| union_extents(acc, positions_extent(item))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn url_request(url: &str) -> LayerRequest {
        LayerRequest {
            name: "layer".to_string(),
            format: FeatureFormat::Kml,
            source: LayerSource::Url {
                url: url.to_string(),
                params: None,
            },
        }
    }

    #[test]
    fn test_add_layer_completes_immediately_by_default() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = MemoryRenderEngine::new();

        let handle = engine
            .add_layer(url_request("http://a"), LoadSignal::new(tx, "o", "f"))
            .unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(event.layer, handle.id());
        assert_eq!(event.overlay_id, "o");
        assert_eq!(event.feature_id, "f");
        assert!(engine.layer(handle.id()).unwrap().loaded);
    }

    #[test]
    fn test_deferred_engine_holds_signals() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = MemoryRenderEngine::deferred();

        engine
            .add_layer(url_request("http://a"), LoadSignal::new(tx, "o", "f"))
            .unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.pending_count(), 1);

        assert_eq!(engine.complete_pending(), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_rejected_url() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut engine = MemoryRenderEngine::new();
        engine.reject_url("http://bad");

        let result = engine.add_layer(url_request("http://bad"), LoadSignal::new(tx, "o", "f"));
        assert!(matches!(result, Err(RenderError::LayerRejected { .. })));
        assert_eq!(engine.layer_count(), 0);
    }

    #[test]
    fn test_hide_show_remove() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut engine = MemoryRenderEngine::new();
        let handle = engine
            .add_layer(url_request("http://a"), LoadSignal::new(tx, "o", "f"))
            .unwrap();
        let id = handle.id();

        engine.hide_layer(&handle);
        assert!(!engine.is_visible(id));
        engine.show_layer(&handle);
        assert!(engine.is_visible(id));

        engine.remove_layer(handle);
        assert_eq!(engine.layer_count(), 0);
        assert_eq!(engine.removed_layers(), [id]);
    }

    #[test]
    fn test_layer_shape_from_registered_url() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut engine = MemoryRenderEngine::new();
        let shape = LayerShape::ImageSet(vec![Bounds::from_edges(0.0, 0.0, 1.0, 1.0)]);
        engine.set_layer_shape("http://a", shape.clone());

        let known = engine
            .add_layer(url_request("http://a"), LoadSignal::new(tx.clone(), "o", "f"))
            .unwrap();
        let unknown = engine
            .add_layer(url_request("http://b"), LoadSignal::new(tx, "o", "g"))
            .unwrap();

        assert_eq!(engine.layer_shape(&known), Some(shape));
        assert_eq!(engine.layer_shape(&unknown), Some(LayerShape::Single(None)));
    }

    #[test]
    fn test_geojson_extent() {
        let data = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"rgb": [255, 0, 0]},
                 "geometry": {"type": "Point", "coordinates": [10.0, 50.0]}},
                {"type": "Feature",
                 "geometry": {"type": "LineString", "coordinates": [[-5.0, 40.0], [2.0, 45.0]]}}
            ]
        });
        assert_eq!(
            geojson_extent(&data),
            Some(Bounds::from_edges(40.0, -5.0, 50.0, 10.0))
        );
    }

    #[test]
    fn test_geojson_extent_from_text() {
        let data = Value::String(r#"{"type":"Point","coordinates":[1.5,2.5]}"#.to_string());
        assert_eq!(
            geojson_extent(&data),
            Some(Bounds::from_edges(2.5, 1.5, 2.5, 1.5))
        );
    }

    #[test]
    fn test_center_at_keeps_extent_size() {
        let mut engine = MemoryRenderEngine::new();
        engine.set_extent(Bounds::from_edges(0.0, 0.0, 10.0, 20.0));
        engine.center_at(LatLon::new(40.0, 40.0));

        assert_eq!(engine.extent(), Bounds::from_edges(35.0, 30.0, 45.0, 50.0));
    }

    #[test]
    fn test_center_at_stays_on_the_globe() {
        let mut engine = MemoryRenderEngine::new();
        engine.center_at(LatLon::new(40.0, 40.0));

        assert_eq!(engine.extent(), Bounds::from_edges(-50.0, -140.0, 90.0, 180.0));
    }
}
