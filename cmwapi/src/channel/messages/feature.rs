//! `map.feature.*` records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{check_not_empty, default_overlay_id, Message};
use crate::validator::{require_non_empty, ValidationError};

/// Format assumed when a plot request does not name one.
pub const DEFAULT_FORMAT: &str = "kml";

fn check_feature_id(feature_id: &Option<String>, errors: &mut Vec<ValidationError>) {
    if let Err(e) = require_non_empty(feature_id, "featureId") {
        errors.push(e);
    }
}

/// `map.feature.plot`: inline feature data.
///
/// `{overlayId?, featureId, name?, format?, feature, zoom?}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePlot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<bool>,
}

impl FeaturePlot {
    pub fn new(feature_id: impl Into<String>, feature: Value) -> Self {
        Self {
            feature_id: Some(feature_id.into()),
            feature: Some(feature),
            ..Default::default()
        }
    }

    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }

    pub fn feature_id(&self) -> &str {
        self.feature_id.as_deref().unwrap_or_default()
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }
}

impl Message for FeaturePlot {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
        if self.format.is_none() {
            self.format = Some(DEFAULT_FORMAT.to_string());
        }
        if self.zoom.is_none() {
            self.zoom = Some(false);
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        check_feature_id(&self.feature_id, &mut errors);
        if matches!(self.feature, None | Some(Value::Null)) {
            errors.push(ValidationError::MissingField("feature"));
        }
        errors
    }
}

/// `map.feature.plot.url`: feature data fetched by the map.
///
/// `{overlayId?, featureId, name?, format?, url, params?, zoom?}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePlotUrl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<bool>,
}

impl FeaturePlotUrl {
    pub fn new(feature_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            feature_id: Some(feature_id.into()),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn in_overlay(mut self, overlay_id: impl Into<String>) -> Self {
        self.overlay_id = Some(overlay_id.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }

    pub fn feature_id(&self) -> &str {
        self.feature_id.as_deref().unwrap_or_default()
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }
}

impl Message for FeaturePlotUrl {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
        if self.format.is_none() {
            self.format = Some(DEFAULT_FORMAT.to_string());
        }
        if self.zoom.is_none() {
            self.zoom = Some(false);
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        check_feature_id(&self.feature_id, &mut errors);
        if let Err(e) = require_non_empty(&self.url, "url") {
            errors.push(e);
        }
        errors
    }
}

/// `map.feature.unplot`, `map.feature.hide`, `map.feature.show`:
/// `{overlayId?, featureId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
}

impl FeatureTarget {
    pub fn new(overlay_id: impl Into<String>, feature_id: impl Into<String>) -> Self {
        Self {
            overlay_id: Some(overlay_id.into()),
            feature_id: Some(feature_id.into()),
        }
    }

    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }

    pub fn feature_id(&self) -> &str {
        self.feature_id.as_deref().unwrap_or_default()
    }
}

impl Message for FeatureTarget {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        check_feature_id(&self.feature_id, &mut errors);
        errors
    }
}

/// `map.feature.update`: `{overlayId?, featureId, name?, newOverlayId?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_overlay_id: Option<String>,
}

impl FeatureUpdate {
    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }

    pub fn feature_id(&self) -> &str {
        self.feature_id.as_deref().unwrap_or_default()
    }
}

impl Message for FeatureUpdate {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        check_feature_id(&self.feature_id, &mut errors);
        check_not_empty(&self.new_overlay_id, "newOverlayId", &mut errors);
        errors
    }
}

/// `map.feature.selected`, `map.feature.deselected`:
/// `{overlayId?, featureId, selectedId?, selectedName?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_name: Option<String>,
}

impl FeatureSelection {
    pub fn new(overlay_id: impl Into<String>, feature_id: impl Into<String>) -> Self {
        Self {
            overlay_id: Some(overlay_id.into()),
            feature_id: Some(feature_id.into()),
            ..Default::default()
        }
    }

    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }

    pub fn feature_id(&self) -> &str {
        self.feature_id.as_deref().unwrap_or_default()
    }
}

impl Message for FeatureSelection {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        check_feature_id(&self.feature_id, &mut errors);
        errors
    }
}
