//! `map.overlay.*` records.

use serde::{Deserialize, Serialize};

use super::{check_not_empty, default_overlay_id, Message};
use crate::validator::ValidationError;

/// `map.overlay.create`: `{overlayId?, name?, parentId?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl OverlayCreate {
    /// Create a record for an overlay id.
    pub fn new(overlay_id: impl Into<String>) -> Self {
        Self {
            overlay_id: Some(overlay_id.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Overlay id; always present once defaults are applied.
    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }
}

impl Message for OverlayCreate {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
        if self.name.is_none() {
            self.name = self.overlay_id.clone();
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        check_not_empty(&self.parent_id, "parentId", &mut errors);
        errors
    }
}

/// `map.overlay.update`: `{overlayId?, name?, parentId?}`.
///
/// Unlike create, an absent name or parent means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl OverlayUpdate {
    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }
}

impl Message for OverlayUpdate {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        check_not_empty(&self.parent_id, "parentId", &mut errors);
        errors
    }
}

/// `map.overlay.remove`, `map.overlay.hide`, `map.overlay.show`: `{overlayId?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_id: Option<String>,
}

impl OverlayTarget {
    pub fn new(overlay_id: impl Into<String>) -> Self {
        Self {
            overlay_id: Some(overlay_id.into()),
        }
    }

    pub fn overlay_id(&self) -> &str {
        self.overlay_id.as_deref().unwrap_or_default()
    }
}

impl Message for OverlayTarget {
    fn apply_defaults(&mut self, sender: &str) {
        default_overlay_id(&mut self.overlay_id, sender);
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_not_empty(&self.overlay_id, "overlayId", &mut errors);
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults_id_and_name_from_sender() {
        let mut record = OverlayCreate::default();
        record.apply_defaults("widget-7");

        assert_eq!(record.overlay_id.as_deref(), Some("widget-7"));
        assert_eq!(record.name.as_deref(), Some("widget-7"));
        assert!(record.parent_id.is_none());
        assert!(record.validate().is_empty());
    }

    #[test]
    fn test_create_name_defaults_to_given_id() {
        let mut record = OverlayCreate::new("1111");
        record.apply_defaults("widget-7");
        assert_eq!(record.name.as_deref(), Some("1111"));
    }

    #[test]
    fn test_update_leaves_name_absent() {
        let mut record = OverlayUpdate::default();
        record.apply_defaults("widget-7");

        assert_eq!(record.overlay_id(), "widget-7");
        assert!(record.name.is_none());
    }

    #[test]
    fn test_empty_overlay_id_rejected() {
        let mut record = OverlayTarget::new("");
        record.apply_defaults("widget-7");
        assert_eq!(record.validate(), vec![ValidationError::EmptyField("overlayId")]);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let record = OverlayCreate::new("a").with_parent("p");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["overlayId"], "a");
        assert_eq!(json["parentId"], "p");
        assert!(json.get("name").is_none());
    }
}
