//! `map.view.*` records.

use serde::{Deserialize, Serialize};

use super::{check_not_empty, default_overlay_id, Message};
use crate::coord::{Bounds, LatLon};
use crate::validator::{
    require, require_non_empty, validate_bounds, validate_lat_lon, validate_one_of,
    validate_range, validate_zoom, ValidationError, Zoom, CLICK_BUTTONS, CLICK_KEYS, CLICK_TYPES,
};

fn check_zoom(zoom: &Option<Zoom>, errors: &mut Vec<ValidationError>) {
    if let Some(zoom) = zoom {
        if let Err(e) = validate_zoom(zoom) {
            errors.push(e);
        }
    }
}

/// `map.view.zoom`: `{range}` with range > 0 (camera altitude in meters).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewZoom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,
}

impl ViewZoom {
    pub fn new(range: f64) -> Self {
        Self { range: Some(range) }
    }
}

impl Message for ViewZoom {
    fn apply_defaults(&mut self, _sender: &str) {}

    fn validate(&self) -> Vec<ValidationError> {
        match require(&self.range, "range").and_then(|r| validate_range(*r)) {
            Ok(()) => Vec::new(),
            Err(e) => vec![e],
        }
    }
}

/// `map.view.center.overlay`: `{overlayId?, zoom?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCenterOverlay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<Zoom>,
}

impl ViewCenterOverlay {
    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }
}

impl Message for ViewCenterOverlay {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        check_zoom(&self.zoom, &mut errors);
        errors
    }
}

/// `map.view.center.feature`: `{overlayId?, featureId, zoom?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCenterFeature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<Zoom>,
}

impl ViewCenterFeature {
    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }

    pub fn feature_id(&self) -> &str {
        self.feature_id.as_deref().unwrap_or_default()
    }
}

impl Message for ViewCenterFeature {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        if let Err(e) = require_non_empty(&self.feature_id, "featureId") {
            errors.push(e);
        }
        check_zoom(&self.zoom, &mut errors);
        errors
    }
}

/// `map.view.center.location`: `{location: {lat, lon}, zoom?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewCenterLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<Zoom>,
}

impl ViewCenterLocation {
    pub fn new(location: LatLon) -> Self {
        Self {
            location: Some(location),
            zoom: None,
        }
    }

    pub fn with_zoom(mut self, zoom: Zoom) -> Self {
        self.zoom = Some(zoom);
        self
    }
}

impl Message for ViewCenterLocation {
    fn apply_defaults(&mut self, _sender: &str) {}

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(e) = require(&self.location, "location").and_then(validate_lat_lon) {
            errors.push(e);
        }
        check_zoom(&self.zoom, &mut errors);
        errors
    }
}

/// `map.view.center.bounds`: `{bounds: {southWest, northEast}, zoom?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewCenterBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<Zoom>,
}

impl ViewCenterBounds {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds: Some(bounds),
            zoom: None,
        }
    }

    pub fn with_zoom(mut self, zoom: Zoom) -> Self {
        self.zoom = Some(zoom);
        self
    }
}

impl Message for ViewCenterBounds {
    fn apply_defaults(&mut self, _sender: &str) {}

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(e) = require(&self.bounds, "bounds").and_then(validate_bounds) {
            errors.push(e);
        }
        check_zoom(&self.zoom, &mut errors);
        errors
    }
}

/// `map.view.clicked`: `{lat, lon, button?, type?, keys?}`.
///
/// Published by the map when the user clicks it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewClicked {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
}

impl ViewClicked {
    pub fn at(point: LatLon) -> Self {
        Self {
            lat: Some(point.lat),
            lon: Some(point.lon),
            ..Default::default()
        }
    }
}

impl Message for ViewClicked {
    fn apply_defaults(&mut self, _sender: &str) {
        if self.button.is_none() {
            self.button = Some(CLICK_BUTTONS[0].to_string());
        }
        if self.kind.is_none() {
            self.kind = Some(CLICK_TYPES[0].to_string());
        }
        if self.keys.is_none() {
            self.keys = Some(Vec::new());
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                if let Err(e) = validate_lat_lon(&LatLon::new(lat, lon)) {
                    errors.push(e);
                }
            }
            (lat, lon) => {
                if lat.is_none() {
                    errors.push(ValidationError::MissingField("lat"));
                }
                if lon.is_none() {
                    errors.push(ValidationError::MissingField("lon"));
                }
            }
        }
        if let Some(button) = &self.button {
            if let Err(e) = validate_one_of("button", button, &CLICK_BUTTONS) {
                errors.push(e);
            }
        }
        if let Some(kind) = &self.kind {
            if let Err(e) = validate_one_of("type", kind, &CLICK_TYPES) {
                errors.push(e);
            }
        }
        for key in self.keys.iter().flatten() {
            if let Err(e) = validate_one_of("keys", key, &CLICK_KEYS) {
                errors.push(e);
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zoom_range_must_be_positive() {
        assert!(ViewZoom::new(100.0).validate().is_empty());
        assert_eq!(
            ViewZoom::new(0.0).validate(),
            vec![ValidationError::InvalidRange(0.0)]
        );
        assert_eq!(
            ViewZoom::default().validate(),
            vec![ValidationError::MissingField("range")]
        );
    }

    #[test]
    fn test_center_location_zoom_variants() {
        let record: ViewCenterLocation = serde_json::from_value(json!({
            "location": {"lat": 10.0, "lon": 20.0}, "zoom": "auto"
        }))
        .unwrap();
        assert!(record.validate().is_empty());

        let record: ViewCenterLocation = serde_json::from_value(json!({
            "location": {"lat": 10.0, "lon": 20.0}, "zoom": "closer"
        }))
        .unwrap();
        let errors = record.validate();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidZoom(_)]
        ));

        let record: ViewCenterLocation = serde_json::from_value(json!({
            "location": {"lat": 10.0, "lon": 20.0}, "zoom": -3
        }))
        .unwrap();
        assert_eq!(record.validate().len(), 1);
    }

    #[test]
    fn test_center_location_requires_valid_point() {
        assert_eq!(
            ViewCenterLocation::default().validate(),
            vec![ValidationError::MissingField("location")]
        );
        let bad = ViewCenterLocation::new(LatLon::new(95.0, 0.0));
        assert_eq!(bad.validate(), vec![ValidationError::InvalidLatitude(95.0)]);
    }

    #[test]
    fn test_center_bounds_validates_corners() {
        let good = ViewCenterBounds::new(Bounds::from_edges(1.0, 2.0, 3.0, 4.0));
        assert!(good.validate().is_empty());

        let inverted = ViewCenterBounds::new(Bounds::from_edges(3.0, 2.0, 1.0, 4.0));
        assert_eq!(inverted.validate().len(), 1);
    }

    #[test]
    fn test_center_overlay_defaults_to_sender() {
        let mut record = ViewCenterOverlay::default();
        record.apply_defaults("w");
        assert_eq!(record.overlay_id(), "w");
    }

    #[test]
    fn test_clicked_defaults_and_enums() {
        let mut record = ViewClicked::at(LatLon::new(1.0, 2.0));
        record.apply_defaults("w");

        assert_eq!(record.button.as_deref(), Some("left"));
        assert_eq!(record.kind.as_deref(), Some("single"));
        assert_eq!(record.keys, Some(vec![]));
        assert!(record.validate().is_empty());

        record.button = Some("thumb".into());
        record.keys = Some(vec!["shift".into(), "meta".into()]);
        assert_eq!(record.validate().len(), 2);
    }
}
