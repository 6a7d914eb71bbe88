//! Extent calculator
//!
//! Reduces trees of render-engine layer shapes to a single bounding region
//! and converts between camera altitude and render-engine scale.
//!
//! The altitude model assumes a camera with a 60° field of view looking
//! straight down: the visible ground width at altitude `a` is
//! `2 · a · sin(30°) / sin(60°)`.

mod types;

pub use types::{Extent, LayerShape, DPI, INCHES_PER_METER};

use std::collections::HashMap;

use crate::registry::{Feature, Overlay};
use crate::render::RenderEngine;

/// Returns `a` when `b` is absent, otherwise the smallest extent covering both.
///
/// An absent `a` yields `b`, so extents can be folded from `None`.
pub fn union_extents(a: Option<Extent>, b: Option<Extent>) -> Option<Extent> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Extent of a layer, walking sub-layers and images recursively.
pub fn find_layer_extent(shape: &LayerShape) -> Option<Extent> {
    match shape {
        LayerShape::Composite(layers) => layers
            .iter()
            .fold(None, |acc, layer| union_extents(acc, find_layer_extent(layer))),
        LayerShape::ImageSet(images) => images
            .iter()
            .fold(None, |acc, image| union_extents(acc, Some(*image))),
        LayerShape::Single(extent) => *extent,
    }
}

/// Extent of a feature's render layer, if the engine knows it.
pub fn find_feature_extent<E: RenderEngine + ?Sized>(
    engine: &E,
    feature: &Feature,
) -> Option<Extent> {
    let shape = engine.layer_shape(&feature.render_handle)?;
    find_layer_extent(&shape)
}

/// Extent of an overlay: its features and every descendant overlay.
///
/// Unknown overlay ids have no extent.
pub fn find_overlay_extent<E: RenderEngine + ?Sized>(
    overlays: &HashMap<String, Overlay>,
    engine: &E,
    overlay_id: &str,
) -> Option<Extent> {
    let overlay = overlays.get(overlay_id)?;

    let features = overlay
        .features
        .values()
        .fold(None, |acc, feature| {
            union_extents(acc, find_feature_extent(engine, feature))
        });

    overlay.children.iter().fold(features, |acc, child| {
        union_extents(acc, find_overlay_extent(overlays, engine, child))
    })
}

/// Ground width in meters visible from `altitude` meters.
#[inline]
fn ground_width(altitude: f64) -> f64 {
    2.0 * altitude * 30f64.to_radians().sin() / 60f64.to_radians().sin()
}

/// Convert a camera altitude in meters to a render-engine scale for a view
/// `view_width_pixels` wide.
pub fn zoom_altitude_to_scale(view_width_pixels: f64, altitude: f64) -> f64 {
    ground_width(altitude) * DPI * INCHES_PER_METER / view_width_pixels
}

/// Convert a render-engine scale back to a camera altitude in meters.
pub fn scale_to_zoom_altitude(view_width_pixels: f64, scale: f64) -> f64 {
    let ground_width = scale * view_width_pixels / (DPI * INCHES_PER_METER);
    ground_width / 2.0 * 60f64.to_radians().sin() / 30f64.to_radians().sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Bounds;

    fn extent(s: f64, w: f64, n: f64, e: f64) -> Extent {
        Bounds::from_edges(s, w, n, e)
    }

    #[test]
    fn test_union_with_absent_returns_first() {
        let a = extent(0.0, 0.0, 1.0, 1.0);
        assert_eq!(union_extents(Some(a), None), Some(a));
        assert_eq!(union_extents(None, Some(a)), Some(a));
        assert_eq!(union_extents(None, None), None);
    }

    #[test]
    fn test_union_covers_both() {
        let a = extent(0.0, 0.0, 1.0, 1.0);
        let b = extent(-2.0, 3.0, 0.5, 4.0);
        assert_eq!(union_extents(Some(a), Some(b)), Some(extent(-2.0, 0.0, 1.0, 4.0)));
    }

    #[test]
    fn test_layer_extent_single() {
        let e = extent(10.0, 10.0, 20.0, 20.0);
        assert_eq!(find_layer_extent(&LayerShape::Single(Some(e))), Some(e));
        assert_eq!(find_layer_extent(&LayerShape::Single(None)), None);
    }

    #[test]
    fn test_layer_extent_image_set() {
        let shape = LayerShape::ImageSet(vec![
            extent(0.0, 0.0, 1.0, 1.0),
            extent(5.0, 5.0, 6.0, 6.0),
        ]);
        assert_eq!(find_layer_extent(&shape), Some(extent(0.0, 0.0, 6.0, 6.0)));
        assert_eq!(find_layer_extent(&LayerShape::ImageSet(vec![])), None);
    }

    #[test]
    fn test_layer_extent_nested_composite() {
        let shape = LayerShape::Composite(vec![
            LayerShape::Single(None),
            LayerShape::Composite(vec![
                LayerShape::Single(Some(extent(-10.0, -20.0, 0.0, 0.0))),
                LayerShape::ImageSet(vec![extent(1.0, 1.0, 2.0, 30.0)]),
            ]),
        ]);
        assert_eq!(
            find_layer_extent(&shape),
            Some(extent(-10.0, -20.0, 2.0, 30.0))
        );
    }

    #[test]
    fn test_altitude_scale_known_value() {
        // 1000 m altitude on a 1000 px wide view
        let expected = 2.0 * 1000.0 * 0.5 / (3f64.sqrt() / 2.0) * 120.0 * 39.37 / 1000.0;
        let scale = zoom_altitude_to_scale(1000.0, 1000.0);
        assert!((scale - expected).abs() < 1e-6, "scale = {}", scale);
    }

    #[test]
    fn test_altitude_scale_approximate_inverse() {
        for width in [320.0, 1024.0, 1920.0] {
            for altitude in [1.0, 150.0, 12_345.6, 1.0e7] {
                let back = scale_to_zoom_altitude(width, zoom_altitude_to_scale(width, altitude));
                assert!(
                    ((back - altitude) / altitude).abs() < 1e-9,
                    "width {} altitude {} came back as {}",
                    width,
                    altitude,
                    back
                );
            }
        }
    }

    #[test]
    fn test_scale_grows_with_altitude() {
        let low = zoom_altitude_to_scale(800.0, 100.0);
        let high = zoom_altitude_to_scale(800.0, 10_000.0);
        assert!(high > low);
    }
}
