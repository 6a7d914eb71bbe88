//! `map.view.*` handlers.
//!
//! Every camera move is followed by a `map.status.view` describing where the
//! camera ended up.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::Context;
use crate::channel::{
    StatusView, Topic, ViewCenterBounds, ViewCenterFeature, ViewCenterLocation, ViewCenterOverlay,
    ViewZoom,
};
use crate::extent::{scale_to_zoom_altitude, zoom_altitude_to_scale, Extent};
use crate::registry::{Registry, RegistryError};
use crate::render::RenderEngine;
use crate::validator::Zoom;

/// Frame `extent`: fit it for "auto" or no zoom, otherwise center on it at
/// the requested altitude.
fn frame<E: RenderEngine>(engine: &mut E, extent: Extent, zoom: Option<&Zoom>) {
    match zoom.and_then(Zoom::range) {
        Some(altitude) => {
            engine.center_at(extent.center());
            set_altitude(engine, altitude);
        }
        None => engine.set_extent(extent),
    }
}

fn set_altitude<E: RenderEngine>(engine: &mut E, altitude: f64) {
    let scale = zoom_altitude_to_scale(engine.view_width_pixels(), altitude);
    engine.set_scale(scale);
}

/// Describe the current camera.
pub(super) fn view_status<E: RenderEngine>(engine: &E, requester: Option<String>) -> StatusView {
    let bounds = engine.extent();
    StatusView {
        requester,
        bounds: Some(bounds),
        center: Some(bounds.center()),
        range: Some(scale_to_zoom_altitude(
            engine.view_width_pixels(),
            engine.scale(),
        )),
    }
}

impl<E: RenderEngine> Context<E> {
    /// Move the camera under the registry lock, then publish the new view.
    fn move_camera<M, F>(&self, topic: Topic, record: &M, op: F)
    where
        M: Serialize,
        F: FnOnce(&mut Registry<E>) -> Result<(), RegistryError>,
    {
        let outcome = {
            let mut registry = self.registry.lock();
            op(&mut *registry).map(|()| view_status(registry.engine(), None))
        };

        match outcome {
            Ok(status) => {
                debug!(topic = %topic, "Camera moved");
                if let Err(e) = self.channels.status_view.send_one(status) {
                    warn!(error = %e, "Failed to publish view status");
                }
            }
            Err(e) => self.report(topic, record, &e),
        }
    }
}

pub(super) fn attach<E: RenderEngine + 'static>(ctx: &Arc<Context<E>>) {
    let c = Arc::clone(ctx);
    ctx.channels
        .view_zoom
        .add_handler(move |_sender: &str, records: Vec<ViewZoom>| {
            for record in &records {
                c.move_camera(Topic::ViewZoom, record, |registry| {
                    if let Some(range) = record.range {
                        set_altitude(registry.engine_mut(), range);
                    }
                    Ok(())
                });
            }
        });

    let c = Arc::clone(ctx);
    ctx.channels
        .view_center_overlay
        .add_handler(move |_sender: &str, records: Vec<ViewCenterOverlay>| {
            for record in &records {
                c.move_camera(Topic::ViewCenterOverlay, record, |registry| {
                    let id = record.overlay_id();
                    if registry.overlay(id).is_none() {
                        return Err(RegistryError::UnknownOverlay(id.to_string()));
                    }
                    match registry.overlay_extent(id) {
                        Some(extent) => frame(registry.engine_mut(), extent, record.zoom.as_ref()),
                        None => warn!(overlay_id = id, "Overlay has no known extent"),
                    }
                    Ok(())
                });
            }
        });

    let c = Arc::clone(ctx);
    ctx.channels
        .view_center_feature
        .add_handler(move |_sender: &str, records: Vec<ViewCenterFeature>| {
            for record in &records {
                c.move_camera(Topic::ViewCenterFeature, record, |registry| {
                    let (overlay_id, feature_id) = (record.overlay_id(), record.feature_id());
                    if registry.feature(overlay_id, feature_id).is_none() {
                        return Err(if registry.overlay(overlay_id).is_none() {
                            RegistryError::UnknownOverlay(overlay_id.to_string())
                        } else {
                            RegistryError::UnknownFeature {
                                overlay_id: overlay_id.to_string(),
                                feature_id: feature_id.to_string(),
                            }
                        });
                    }
                    match registry.feature_extent(overlay_id, feature_id) {
                        Some(extent) => frame(registry.engine_mut(), extent, record.zoom.as_ref()),
                        None => warn!(overlay_id, feature_id, "Feature has no known extent"),
                    }
                    Ok(())
                });
            }
        });

    let c = Arc::clone(ctx);
    ctx.channels
        .view_center_location
        .add_handler(move |_sender: &str, records: Vec<ViewCenterLocation>| {
            for record in &records {
                c.move_camera(Topic::ViewCenterLocation, record, |registry| {
                    let engine = registry.engine_mut();
                    if let Some(location) = record.location {
                        engine.center_at(location);
                    }
                    if let Some(altitude) = record.zoom.as_ref().and_then(Zoom::range) {
                        set_altitude(engine, altitude);
                    }
                    Ok(())
                });
            }
        });

    let c = Arc::clone(ctx);
    ctx.channels
        .view_center_bounds
        .add_handler(move |_sender: &str, records: Vec<ViewCenterBounds>| {
            for record in &records {
                c.move_camera(Topic::ViewCenterBounds, record, |registry| {
                    if let Some(bounds) = record.bounds {
                        frame(registry.engine_mut(), bounds, record.zoom.as_ref());
                    }
                    Ok(())
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::adapter::tests::{harness, Harness};
    use crate::coord::Bounds;
    use crate::render::RenderEngine;
    use crate::transport::Transport;

    #[test]
    fn test_center_bounds_auto_fits_extent() {
        let Harness { bus, adapter, peer } = harness();
        let bounds = json!({
            "southWest": {"lat": 10.0, "lon": 20.0},
            "northEast": {"lat": 30.0, "lon": 40.0}
        });

        peer.publish("map.view.center.bounds", json!({"bounds": bounds.clone(), "zoom": "auto"}))
            .unwrap();

        assert_eq!(
            adapter.registry().lock().engine().extent(),
            Bounds::from_edges(10.0, 20.0, 30.0, 40.0)
        );
        let views = bus.published_on("map.status.view");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].sender, "map");
        assert_eq!(views[0].payload["bounds"], bounds);
        assert_eq!(views[0].payload["center"], json!({"lat": 20.0, "lon": 30.0}));
    }

    #[test]
    fn test_center_location_with_altitude() {
        let Harness { bus, adapter, peer } = harness();
        adapter
            .registry()
            .lock()
            .engine_mut()
            .set_extent(Bounds::from_edges(10.0, 20.0, 30.0, 40.0));

        peer.publish(
            "map.view.center.location",
            json!({"location": {"lat": 5.0, "lon": 6.0}, "zoom": 25000.0}),
        )
        .unwrap();

        let extent = adapter.registry().lock().engine().extent();
        assert_eq!(extent, Bounds::from_edges(-5.0, -4.0, 15.0, 16.0));

        let views = bus.published_on("map.status.view");
        assert_eq!(views.len(), 1);
        let range = views[0].payload["range"].as_f64().unwrap();
        assert!((range - 25000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_sets_range() {
        let Harness { bus, peer, .. } = harness();

        peer.publish("map.view.zoom", json!({"range": 1200.0})).unwrap();

        let views = bus.published_on("map.status.view");
        let range = views[0].payload["range"].as_f64().unwrap();
        assert!((range - 1200.0).abs() < 1e-6);
    }

    #[test]
    fn test_center_feature_frames_its_extent() {
        let Harness { adapter, peer, .. } = harness();
        peer.publish(
            "map.feature.plot",
            json!({
                "overlayId": "o",
                "featureId": "line",
                "format": "geojson",
                "feature": {"type": "LineString", "coordinates": [[0.0, 0.0], [10.0, 20.0]]}
            }),
        )
        .unwrap();

        peer.publish("map.view.center.feature", json!({"overlayId": "o", "featureId": "line"}))
            .unwrap();

        assert_eq!(
            adapter.registry().lock().engine().extent(),
            Bounds::from_edges(0.0, 0.0, 20.0, 10.0)
        );
    }

    #[test]
    fn test_center_bounds_across_antimeridian_rejected() {
        let Harness { bus, adapter, peer } = harness();
        let before = adapter.registry().lock().engine().extent();

        peer.publish(
            "map.view.center.bounds",
            json!({
                "bounds": {
                    "southWest": {"lat": 0.0, "lon": 170.0},
                    "northEast": {"lat": 10.0, "lon": -170.0}
                },
                "zoom": 5000.0
            }),
        )
        .unwrap();

        assert_eq!(adapter.registry().lock().engine().extent(), before);
        assert!(bus.published_on("map.status.view").is_empty());
        let errors = bus.published_on("map.error");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].payload["error"]
            .as_str()
            .unwrap()
            .contains("longitude 170"));
    }

    #[test]
    fn test_center_unknown_overlay_reports_and_keeps_camera() {
        let Harness { bus, adapter, peer } = harness();
        let before = adapter.registry().lock().engine().extent();

        peer.publish("map.view.center.overlay", json!({"overlayId": "missing"}))
            .unwrap();

        assert_eq!(adapter.registry().lock().engine().extent(), before);
        assert!(bus.published_on("map.status.view").is_empty());
        let errors = bus.published_on("map.error");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].payload["type"], "map.view.center.overlay");
    }
}
