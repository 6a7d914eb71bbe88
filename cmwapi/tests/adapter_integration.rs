//! Integration tests for map widgets driven over the bus.
//!
//! Two map widgets and a planner share one bus. The planner drives the maps
//! through typed channels and observes their replies:
//! - overlay and feature traffic reaching every attached map
//! - reference failures reported on `map.error` by the map that failed
//! - status request round trips
//! - camera moves answered with `map.status.view`
//!
//! Run with: `cargo test --test adapter_integration`

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use cmwapi::adapter::MapAdapter;
use cmwapi::channel::{
    ChannelSet, FeaturePlotUrl, FeatureSelection, FeatureTarget, OverlayCreate, OverlayTarget,
    StatusAbout, StatusRequest, StatusSelected, StatusView, ViewCenterBounds,
};
use cmwapi::config::{ConfigFile, WidgetSettings};
use cmwapi::coord::Bounds;
use cmwapi::extent::LayerShape;
use cmwapi::render::{MemoryRenderEngine, RenderEngine};
use cmwapi::transport::InMemoryBus;
use cmwapi::validator::Zoom;

// ============================================================================
// Test Helpers
// ============================================================================

struct Dashboard {
    bus: InMemoryBus,
    north: MapAdapter<MemoryRenderEngine>,
    south: MapAdapter<MemoryRenderEngine>,
    planner: ChannelSet,
}

fn map(bus: &InMemoryBus, name: &str) -> MapAdapter<MemoryRenderEngine> {
    let mut config = ConfigFile::default();
    config.widget = WidgetSettings {
        name: name.to_string(),
        version: "1.1.0".to_string(),
        widget_type: "3-D".to_string(),
    };
    let adapter = MapAdapter::from_config(bus.connect(name), MemoryRenderEngine::new(), &config);
    adapter.attach();
    adapter
}

fn dashboard() -> Dashboard {
    let bus = InMemoryBus::new();
    let north = map(&bus, "north-map");
    let south = map(&bus, "south-map");
    let planner = ChannelSet::new(bus.connect("planner"));
    Dashboard {
        bus,
        north,
        south,
        planner,
    }
}

type Inbox<M> = Arc<Mutex<Vec<(String, M)>>>;

fn collect<M: cmwapi::channel::Message>(channel: &cmwapi::channel::Channel<M>) -> Inbox<M> {
    let inbox: Inbox<M> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&inbox);
    channel.add_handler(move |sender: &str, records: Vec<M>| {
        let mut sink = sink.lock();
        for record in records {
            sink.push((sender.to_string(), record));
        }
    });
    inbox
}

// ============================================================================
// Overlays and features
// ============================================================================

#[test]
fn test_every_map_builds_the_same_tree() {
    let d = dashboard();

    d.planner
        .overlay_create
        .send(vec![
            OverlayCreate::new("ops"),
            OverlayCreate::new("ops/air").with_parent("ops"),
        ])
        .unwrap();

    for adapter in [&d.north, &d.south] {
        let registry = adapter.registry();
        let registry = registry.lock();
        let roots: Vec<&str> = registry.root_overlays().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(roots, ["ops"]);
        assert!(registry.overlay("ops").unwrap().children.contains("ops/air"));
    }

    d.planner
        .overlay_remove
        .send_one(OverlayTarget::new("ops"))
        .unwrap();

    for adapter in [&d.north, &d.south] {
        assert!(adapter.registry().lock().overlays().is_empty());
    }
}

#[test]
fn test_each_map_reports_its_own_failure() {
    let d = dashboard();

    d.planner
        .feature_hide
        .send_one(FeatureTarget::new("nowhere", "thing"))
        .unwrap();

    let errors = d.bus.published_on("map.error");
    let mut senders: Vec<&str> = errors.iter().map(|e| e.sender.as_str()).collect();
    senders.sort_unstable();
    assert_eq!(senders, ["north-map", "south-map"]);
    for error in &errors {
        assert_eq!(error.payload["type"], "map.feature.hide");
        assert_eq!(
            error.payload["msg"],
            json!({"overlayId": "nowhere", "featureId": "thing"})
        );
        assert!(error.payload["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid_id: "));
    }
}

#[test]
fn test_plot_url_uses_engine_extent() {
    let d = dashboard();
    let url = "http://tiles.example.com/storms.kml";
    d.north.registry().lock().engine_mut().set_layer_shape(
        url,
        LayerShape::Composite(vec![
            LayerShape::Single(Some(Bounds::from_edges(10.0, 10.0, 20.0, 20.0))),
            LayerShape::ImageSet(vec![Bounds::from_edges(15.0, 5.0, 25.0, 15.0)]),
        ]),
    );

    d.planner
        .feature_plot_url
        .send_one(FeaturePlotUrl::new("storms", url).in_overlay("weather"))
        .unwrap();

    let registry = d.north.registry();
    let registry = registry.lock();
    assert_eq!(
        registry.overlay_extent("weather"),
        Some(Bounds::from_edges(10.0, 5.0, 25.0, 20.0))
    );
}

// ============================================================================
// Status
// ============================================================================

#[test]
fn test_status_request_round_trip() {
    let d = dashboard();
    let views = collect(&d.planner.status_view);
    let abouts = collect(&d.planner.status_about);
    let selections = collect(&d.planner.status_selected);

    d.planner
        .feature_plot_url
        .send_one(FeaturePlotUrl::new("f", "http://x/f.kml").in_overlay("o"))
        .unwrap();
    let mut selection = FeatureSelection::new("o", "f");
    selection.selected_id = Some("placemark-2".to_string());
    d.planner.feature_selected.send_one(selection).unwrap();

    d.planner
        .status_request
        .send_one(StatusRequest::for_types(&["view", "about", "selected"]))
        .unwrap();

    let views = views.lock();
    assert_eq!(views.len(), 2);
    assert!(views
        .iter()
        .all(|(_, v): &(String, StatusView)| v.requester.as_deref() == Some("planner")));

    let mut abouts: Vec<(String, StatusAbout)> = abouts.lock().clone();
    abouts.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(abouts[0].0, "north-map");
    assert_eq!(abouts[0].1.widget_name.as_deref(), Some("north-map"));
    assert_eq!(abouts[0].1.kind.as_deref(), Some("3-D"));
    assert_eq!(abouts[0].1.version.as_deref(), Some("1.1.0"));

    let selections = selections.lock();
    assert_eq!(selections.len(), 2);
    let (_, selected): &(String, StatusSelected) = &selections[0];
    assert_eq!(selected.overlay_id.as_deref(), Some("o"));
    let features = selected.selected_features.as_ref().unwrap();
    assert_eq!(features[0].feature_id.as_deref(), Some("f"));
    assert_eq!(features[0].selected_id.as_deref(), Some("placemark-2"));
}

// ============================================================================
// View
// ============================================================================

#[test]
fn test_center_bounds_moves_every_camera() {
    let d = dashboard();
    let views = collect(&d.planner.status_view);
    let bounds = Bounds::from_edges(-10.0, -20.0, 10.0, 20.0);

    d.planner
        .view_center_bounds
        .send_one(ViewCenterBounds::new(bounds).with_zoom(Zoom::auto()))
        .unwrap();

    for adapter in [&d.north, &d.south] {
        assert_eq!(adapter.registry().lock().engine().extent(), bounds);
    }
    let views = views.lock();
    assert_eq!(views.len(), 2);
    for (_, view) in views.iter() {
        assert_eq!(view.bounds, Some(bounds));
        assert_eq!(view.requester, None);
    }
}

#[test]
fn test_detached_map_ignores_traffic() {
    let d = dashboard();
    d.south.detach();

    d.planner
        .overlay_create
        .send_one(OverlayCreate::new("late"))
        .unwrap();

    assert!(d.north.registry().lock().overlay("late").is_some());
    assert!(d.south.registry().lock().overlay("late").is_none());
}
