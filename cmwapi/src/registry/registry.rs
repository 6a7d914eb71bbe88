//! The overlay/feature forest.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use super::error::RegistryError;
use super::types::{Feature, FeatureFormat, FeatureSource, Overlay, PlotOptions, TreeChanged};
use crate::extent::{find_feature_extent, find_overlay_extent, Extent};
use crate::render::{LayerRequest, LoadEvent, LoadSignal, RenderEngine};

/// Default capacity of the tree-changed broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Owns every overlay and feature and keeps the render engine in step.
///
/// Overlays reference each other by id. A `parent_id` naming an overlay that
/// does not exist yet is kept as a pending link and resolved when that
/// overlay is created.
pub struct Registry<E: RenderEngine> {
    overlays: HashMap<String, Overlay>,
    engine: E,
    tree_tx: broadcast::Sender<TreeChanged>,
    load_tx: mpsc::UnboundedSender<LoadEvent>,
    load_rx: mpsc::UnboundedReceiver<LoadEvent>,
}

impl<E: RenderEngine> Registry<E> {
    pub fn new(engine: E) -> Self {
        Self::with_event_capacity(engine, DEFAULT_EVENT_CAPACITY)
    }

    /// Create a registry whose tree-changed channel buffers `capacity`
    /// notifications per receiver.
    pub fn with_event_capacity(engine: E, capacity: usize) -> Self {
        let (tree_tx, _) = broadcast::channel(capacity.max(1));
        let (load_tx, load_rx) = mpsc::unbounded_channel();
        Self {
            overlays: HashMap::new(),
            engine,
            tree_tx,
            load_tx,
            load_rx,
        }
    }

    /// Receive a [`TreeChanged`] after every change to the tree.
    pub fn subscribe(&self) -> broadcast::Receiver<TreeChanged> {
        self.tree_tx.subscribe()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    /// Create an overlay, or update it if `id` already exists.
    pub fn create_overlay(
        &mut self,
        caller: &str,
        id: &str,
        name: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<(), RegistryError> {
        if self.overlays.contains_key(id) {
            return self.update_overlay(caller, id, name, parent_id);
        }
        if let Some(parent) = parent_id {
            self.check_parent(id, parent)?;
        }

        let mut overlay = Overlay::new(id, name);
        overlay.parent_id = parent_id.map(str::to_string);
        overlay.children = self
            .overlays
            .values()
            .filter(|o| o.parent_id.as_deref() == Some(id))
            .map(|o| o.id.clone())
            .collect();
        if !overlay.children.is_empty() {
            debug!(overlay_id = id, adopted = overlay.children.len(), "Adopted pending children");
        }

        if let Some(parent) = parent_id {
            self.link(id, parent);
        }
        info!(caller, overlay_id = id, name = %overlay.name, parent_id, "Overlay created");
        self.overlays.insert(id.to_string(), overlay);
        self.notify();
        Ok(())
    }

    /// Remove an overlay with all of its features and descendants.
    pub fn remove_overlay(&mut self, caller: &str, id: &str) -> Result<(), RegistryError> {
        if !self.overlays.contains_key(id) {
            return Err(RegistryError::UnknownOverlay(id.to_string()));
        }

        self.remove_subtree(id);
        info!(caller, overlay_id = id, "Overlay removed");
        self.notify();
        Ok(())
    }

    pub fn hide_overlay(&mut self, caller: &str, id: &str) -> Result<(), RegistryError> {
        self.set_overlay_hidden(caller, id, true)
    }

    pub fn show_overlay(&mut self, caller: &str, id: &str) -> Result<(), RegistryError> {
        self.set_overlay_hidden(caller, id, false)
    }

    /// Rename and/or reparent an overlay. Absent arguments leave the current
    /// value alone.
    pub fn update_overlay(
        &mut self,
        caller: &str,
        id: &str,
        name: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<(), RegistryError> {
        let current_parent = self
            .overlays
            .get(id)
            .ok_or_else(|| RegistryError::UnknownOverlay(id.to_string()))?
            .parent_id
            .clone();

        let new_parent = parent_id.filter(|p| current_parent.as_deref() != Some(*p));
        if let Some(parent) = new_parent {
            self.check_parent(id, parent)?;
        }

        if let (Some(name), Some(overlay)) = (name, self.overlays.get_mut(id)) {
            if overlay.name != name {
                overlay.name = name.to_string();
            }
        }

        if let Some(parent) = new_parent {
            if let Some(old) = current_parent.as_deref() {
                self.unlink(id, old);
            }
            if let Some(overlay) = self.overlays.get_mut(id) {
                overlay.parent_id = Some(parent.to_string());
            }
            self.link(id, parent);
        }

        info!(caller, overlay_id = id, name, parent_id, "Overlay updated");
        self.notify();
        Ok(())
    }

    fn set_overlay_hidden(
        &mut self,
        caller: &str,
        id: &str,
        hidden: bool,
    ) -> Result<(), RegistryError> {
        let overlay = self
            .overlays
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownOverlay(id.to_string()))?;

        overlay.is_hidden = hidden;
        for feature in overlay.features.values_mut() {
            feature.is_hidden = hidden;
            if hidden {
                self.engine.hide_layer(&feature.render_handle);
            } else {
                self.engine.show_layer(&feature.render_handle);
            }
        }

        info!(caller, overlay_id = id, hidden, "Overlay visibility changed");
        self.notify();
        Ok(())
    }

    /// Reject a parent that is the overlay itself or one of its descendants.
    ///
    /// Pending links count: following `parent_id` from `parent` must never
    /// lead back to `id`.
    fn check_parent(&self, id: &str, parent: &str) -> Result<(), RegistryError> {
        let mut current = Some(parent);
        while let Some(ancestor) = current {
            if ancestor == id {
                return Err(RegistryError::InvalidParent {
                    overlay_id: id.to_string(),
                    parent_id: parent.to_string(),
                });
            }
            current = self
                .overlays
                .get(ancestor)
                .and_then(|o| o.parent_id.as_deref());
        }
        Ok(())
    }

    fn link(&mut self, child: &str, parent: &str) {
        match self.overlays.get_mut(parent) {
            Some(overlay) => {
                overlay.children.insert(child.to_string());
            }
            None => debug!(overlay_id = child, parent_id = parent, "Parent pending"),
        }
    }

    fn unlink(&mut self, child: &str, parent: &str) {
        if let Some(overlay) = self.overlays.get_mut(parent) {
            overlay.children.remove(child);
        }
    }

    /// Depth-first removal without notification.
    fn remove_subtree(&mut self, id: &str) {
        let Some(mut overlay) = self.overlays.remove(id) else {
            return;
        };

        for (_, feature) in overlay.features.drain() {
            debug!(overlay_id = id, feature_id = %feature.feature_id, "Feature removed with overlay");
            self.engine.remove_layer(feature.render_handle);
        }
        for child in std::mem::take(&mut overlay.children) {
            self.remove_subtree(&child);
        }
        if let Some(parent) = overlay.parent_id.as_deref() {
            self.unlink(id, parent);
        }
    }

    // =========================================================================
    // Features
    // =========================================================================

    /// Plot a feature from inline data (KML text or GeoJSON).
    pub fn plot_feature(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
        options: PlotOptions,
        data: Value,
    ) -> Result<(), RegistryError> {
        self.plot(caller, overlay_id, feature_id, options, FeatureSource::Inline(data))
    }

    /// Plot a feature whose content is loaded from `url`.
    pub fn plot_feature_url(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
        options: PlotOptions,
        url: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<(), RegistryError> {
        let source = FeatureSource::Url {
            url: url.to_string(),
            params,
        };
        self.plot(caller, overlay_id, feature_id, options, source)
    }

    /// Shared plot path.
    ///
    /// Tree-changed and zoom-on-create fire from [`process_load_events`]
    /// once the engine reports the layer as loaded.
    ///
    /// [`process_load_events`]: Registry::process_load_events
    fn plot(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
        options: PlotOptions,
        source: FeatureSource,
    ) -> Result<(), RegistryError> {
        let format: FeatureFormat = options.format.parse()?;
        match &source {
            FeatureSource::Inline(_) if !format.supports_inline() => {
                return Err(RegistryError::InvalidDataFormat(format.to_string()));
            }
            FeatureSource::Url { .. } if !format.supports_url() => {
                return Err(RegistryError::NotYetImplemented(format!(
                    "Loading {} from a URL",
                    format
                )));
            }
            _ => {}
        }

        let name = options.name.unwrap_or_else(|| feature_id.to_string());
        let request = LayerRequest {
            name: name.clone(),
            format,
            source: source.to_layer_source(),
        };
        let signal = LoadSignal::new(self.load_tx.clone(), overlay_id, feature_id);
        let handle = self.engine.add_layer(request, signal)?;

        if !self.overlays.contains_key(overlay_id) {
            if let Err(e) = self.create_overlay(caller, overlay_id, None, None) {
                self.engine.remove_layer(handle);
                return Err(e);
            }
        }

        let feature = Feature {
            overlay_id: overlay_id.to_string(),
            feature_id: feature_id.to_string(),
            name,
            format,
            source,
            zoom_on_create: options.zoom,
            is_hidden: false,
            is_selected: false,
            selected_id: None,
            selected_name: None,
            render_handle: handle,
        };

        let Some(overlay) = self.overlays.get_mut(overlay_id) else {
            self.engine.remove_layer(feature.render_handle);
            return Err(RegistryError::UnknownOverlay(overlay_id.to_string()));
        };
        if let Some(replaced) = overlay.features.insert(feature_id.to_string(), feature) {
            debug!(overlay_id, feature_id, "Replacing feature");
            self.engine.remove_layer(replaced.render_handle);
        }

        info!(caller, overlay_id, feature_id, format = %format, "Feature plotted");
        Ok(())
    }

    /// Handle every layer-loaded signal received so far.
    ///
    /// The feature is looked up by its layer, so one moved to another
    /// overlay before loading is still found. Signals for features that were
    /// since deleted, or replaced by a newer plot, are ignored. Returns the
    /// number of signals acted on.
    pub fn process_load_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.load_rx.try_recv() {
            let Some(feature) = self
                .overlays
                .values()
                .flat_map(|o| o.features.values())
                .find(|f| f.render_handle.id() == event.layer)
            else {
                debug!(
                    overlay_id = %event.overlay_id,
                    feature_id = %event.feature_id,
                    layer = %event.layer,
                    "Ignoring load of stale layer"
                );
                continue;
            };

            let zoom_to = if feature.zoom_on_create {
                find_feature_extent(&self.engine, feature)
            } else {
                None
            };
            if let Some(extent) = zoom_to {
                self.engine.set_extent(extent);
            }

            debug!(
                overlay_id = %feature.overlay_id,
                feature_id = %feature.feature_id,
                layer = %event.layer,
                "Feature loaded"
            );
            handled += 1;
            self.notify();
        }
        handled
    }

    /// Unplot a feature and release its layer.
    pub fn delete_feature(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
    ) -> Result<(), RegistryError> {
        let feature = self
            .overlays
            .get_mut(overlay_id)
            .ok_or_else(|| RegistryError::UnknownOverlay(overlay_id.to_string()))?
            .features
            .remove(feature_id)
            .ok_or_else(|| unknown_feature(overlay_id, feature_id))?;

        self.engine.remove_layer(feature.render_handle);
        info!(caller, overlay_id, feature_id, "Feature deleted");
        self.notify();
        Ok(())
    }

    pub fn hide_feature(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
    ) -> Result<(), RegistryError> {
        self.set_feature_hidden(caller, overlay_id, feature_id, true)
    }

    pub fn show_feature(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
    ) -> Result<(), RegistryError> {
        self.set_feature_hidden(caller, overlay_id, feature_id, false)
    }

    fn set_feature_hidden(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
        hidden: bool,
    ) -> Result<(), RegistryError> {
        let feature = feature_in(&mut self.overlays, overlay_id, feature_id)?;
        feature.is_hidden = hidden;
        if hidden {
            self.engine.hide_layer(&feature.render_handle);
        } else {
            self.engine.show_layer(&feature.render_handle);
        }

        info!(caller, overlay_id, feature_id, hidden, "Feature visibility changed");
        self.notify();
        Ok(())
    }

    /// Reframe the camera onto a feature.
    ///
    /// Returns the extent zoomed to, or `None` if the engine does not know
    /// the layer's extent yet (the camera is left alone).
    pub fn zoom_feature(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
    ) -> Result<Option<Extent>, RegistryError> {
        let feature = self
            .feature(overlay_id, feature_id)
            .ok_or_else(|| self.missing(overlay_id, feature_id))?;

        let extent = find_feature_extent(&self.engine, feature);
        match extent {
            Some(extent) => {
                self.engine.set_extent(extent);
                debug!(caller, overlay_id, feature_id, "Zoomed to feature");
            }
            None => warn!(overlay_id, feature_id, "Feature has no known extent"),
        }
        Ok(extent)
    }

    /// Rename a feature and/or move it to another existing overlay.
    ///
    /// Moving onto an id already present in the target overlay replaces that
    /// feature. An unknown target overlay fails without changing anything.
    pub fn update_feature(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
        name: Option<&str>,
        new_overlay_id: Option<&str>,
    ) -> Result<(), RegistryError> {
        feature_in(&mut self.overlays, overlay_id, feature_id)?;
        let target = new_overlay_id.filter(|t| *t != overlay_id);
        if let Some(target) = target {
            if !self.overlays.contains_key(target) {
                return Err(RegistryError::UnknownOverlay(target.to_string()));
            }
        }

        let feature = feature_in(&mut self.overlays, overlay_id, feature_id)?;
        if let Some(name) = name {
            if feature.name != name {
                feature.name = name.to_string();
            }
        }

        if let Some(target) = target {
            let moved = self
                .overlays
                .get_mut(overlay_id)
                .and_then(|o| o.features.remove(feature_id));
            if let Some(mut feature) = moved {
                feature.overlay_id = target.to_string();
                let replaced = self
                    .overlays
                    .get_mut(target)
                    .and_then(|o| o.features.insert(feature_id.to_string(), feature));
                if let Some(replaced) = replaced {
                    debug!(overlay_id = target, feature_id, "Replacing feature");
                    self.engine.remove_layer(replaced.render_handle);
                }
            }
        }

        info!(caller, overlay_id, feature_id, name, new_overlay_id, "Feature updated");
        self.notify();
        Ok(())
    }

    /// Mark a feature as selected, optionally naming the sub-item selected.
    pub fn select_feature(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
        selected_id: Option<&str>,
        selected_name: Option<&str>,
    ) -> Result<(), RegistryError> {
        let feature = feature_in(&mut self.overlays, overlay_id, feature_id)?;
        feature.is_selected = true;
        feature.selected_id = selected_id.map(str::to_string);
        feature.selected_name = selected_name.map(str::to_string);
        debug!(caller, overlay_id, feature_id, "Feature selected");
        Ok(())
    }

    pub fn deselect_feature(
        &mut self,
        caller: &str,
        overlay_id: &str,
        feature_id: &str,
    ) -> Result<(), RegistryError> {
        let feature = feature_in(&mut self.overlays, overlay_id, feature_id)?;
        feature.is_selected = false;
        feature.selected_id = None;
        feature.selected_name = None;
        debug!(caller, overlay_id, feature_id, "Feature deselected");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn overlay(&self, id: &str) -> Option<&Overlay> {
        self.overlays.get(id)
    }

    pub fn overlays(&self) -> &HashMap<String, Overlay> {
        &self.overlays
    }

    pub fn feature(&self, overlay_id: &str, feature_id: &str) -> Option<&Feature> {
        self.overlays.get(overlay_id)?.features.get(feature_id)
    }

    /// Overlays not linked under another overlay, ordered by id.
    pub fn root_overlays(&self) -> Vec<&Overlay> {
        let mut roots: Vec<&Overlay> = self
            .overlays
            .values()
            .filter(|o| match o.parent_id.as_deref() {
                Some(parent) => !self.overlays.contains_key(parent),
                None => true,
            })
            .collect();
        roots.sort_by(|a, b| a.id.cmp(&b.id));
        roots
    }

    /// Overlays with at least one selected feature, ordered by id.
    pub fn selected_features(&self) -> Vec<(&Overlay, Vec<&Feature>)> {
        let mut selected: Vec<(&Overlay, Vec<&Feature>)> = self
            .overlays
            .values()
            .map(|o| (o, o.selected_features()))
            .filter(|(_, features)| !features.is_empty())
            .collect();
        selected.sort_by(|a, b| a.0.id.cmp(&b.0.id));
        selected
    }

    pub fn overlay_extent(&self, id: &str) -> Option<Extent> {
        find_overlay_extent(&self.overlays, &self.engine, id)
    }

    pub fn feature_extent(&self, overlay_id: &str, feature_id: &str) -> Option<Extent> {
        let feature = self.feature(overlay_id, feature_id)?;
        find_feature_extent(&self.engine, feature)
    }

    fn missing(&self, overlay_id: &str, feature_id: &str) -> RegistryError {
        if self.overlays.contains_key(overlay_id) {
            unknown_feature(overlay_id, feature_id)
        } else {
            RegistryError::UnknownOverlay(overlay_id.to_string())
        }
    }

    fn notify(&self) {
        // No receivers is fine
        let _ = self.tree_tx.send(TreeChanged);
    }
}

/// Resolve overlay then feature, borrowing only the overlay map.
fn feature_in<'a>(
    overlays: &'a mut HashMap<String, Overlay>,
    overlay_id: &str,
    feature_id: &str,
) -> Result<&'a mut Feature, RegistryError> {
    overlays
        .get_mut(overlay_id)
        .ok_or_else(|| RegistryError::UnknownOverlay(overlay_id.to_string()))?
        .features
        .get_mut(feature_id)
        .ok_or_else(|| unknown_feature(overlay_id, feature_id))
}

fn unknown_feature(overlay_id: &str, feature_id: &str) -> RegistryError {
    RegistryError::UnknownFeature {
        overlay_id: overlay_id.to_string(),
        feature_id: feature_id.to_string(),
    }
}
