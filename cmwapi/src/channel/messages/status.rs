//! `map.status.*` records.

use serde::{Deserialize, Serialize};

use super::{check_not_empty, default_overlay_id, Message};
use crate::coord::{Bounds, LatLon};
use crate::validator::{
    require, require_non_empty, validate_bounds, validate_lat_lon, validate_one_of,
    validate_range, validate_widget_type, ValidationError, STATUS_TYPES,
};

/// `map.status.request`: `{types?}`; absent means every status type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
}

impl StatusRequest {
    pub fn for_types(types: &[&str]) -> Self {
        Self {
            types: Some(types.iter().map(|t| t.to_string()).collect()),
        }
    }

    /// Requested status types; all of them once defaults are applied.
    pub fn types(&self) -> &[String] {
        self.types.as_deref().unwrap_or_default()
    }
}

impl Message for StatusRequest {
    fn apply_defaults(&mut self, _sender: &str) {
        if self.types.is_none() {
            self.types = Some(STATUS_TYPES.iter().map(|t| t.to_string()).collect());
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        self.types()
            .iter()
            .filter_map(|t| validate_one_of("types", t, &STATUS_TYPES).err())
            .collect()
    }
}

/// `map.status.view`: `{requester?, bounds, center, range}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<LatLon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,
}

impl Message for StatusView {
    fn apply_defaults(&mut self, _sender: &str) {}

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(e) = require(&self.bounds, "bounds").and_then(validate_bounds) {
            errors.push(e);
        }
        if let Err(e) = require(&self.center, "center").and_then(validate_lat_lon) {
            errors.push(e);
        }
        if let Err(e) = require(&self.range, "range").and_then(|r| validate_range(*r)) {
            errors.push(e);
        }
        errors
    }
}

/// `map.status.format`: `{formats?}`; absent means `["kml"]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
}

impl Message for StatusFormat {
    fn apply_defaults(&mut self, _sender: &str) {
        if self.formats.is_none() {
            self.formats = Some(vec![super::feature::DEFAULT_FORMAT.to_string()]);
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        match &self.formats {
            Some(formats) if formats.iter().any(|f| f.is_empty()) => {
                vec![ValidationError::EmptyField("formats")]
            }
            _ => Vec::new(),
        }
    }
}

/// `map.status.about`: `{version, type, widgetName}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusAbout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_name: Option<String>,
}

impl Message for StatusAbout {
    fn apply_defaults(&mut self, _sender: &str) {}

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(e) = require_non_empty(&self.version, "version") {
            errors.push(e);
        }
        if let Err(e) = require_non_empty(&self.kind, "type").and_then(validate_widget_type) {
            errors.push(e);
        }
        if let Err(e) = require_non_empty(&self.widget_name, "widgetName") {
            errors.push(e);
        }
        errors
    }
}

/// One entry of `map.status.selected`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFeature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_name: Option<String>,
}

/// `map.status.selected`: `{overlayId?, selectedFeatures: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSelected {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_features: Option<Vec<SelectedFeature>>,
}

impl Message for StatusSelected {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        match &self.selected_features {
            None => errors.push(ValidationError::MissingField("selectedFeatures")),
            Some(features) => {
                for feature in features {
                    if let Err(e) = require_non_empty(&feature.feature_id, "featureId") {
                        errors.push(e);
                    }
                }
            }
        }
        errors
    }
}
