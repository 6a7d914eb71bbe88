//! `map.error` records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Message;
use crate::validator::{require_non_empty, ValidationError};

/// `map.error`: `{sender, type, msg, error}`.
///
/// `type` names the topic or operation that failed, `msg` carries the
/// offending payload and `error` describes every problem found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub msg: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorReport {
    pub fn new(kind: impl Into<String>, msg: Value, error: impl Into<String>) -> Self {
        Self {
            sender: None,
            kind: Some(kind.into()),
            msg,
            error: Some(error.into()),
        }
    }

    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or_default()
    }

    pub fn error(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

impl Message for ErrorReport {
    fn apply_defaults(&mut self, sender: &str) {
        if self.sender.is_none() {
            self.sender = Some(sender.to_string());
        }
    }

    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(e) = require_non_empty(&self.kind, "type") {
            errors.push(e);
        }
        if let Err(e) = require_non_empty(&self.error, "error") {
            errors.push(e);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_wire_shape() {
        let mut report = ErrorReport::new("map.overlay.remove", json!({"overlayId": "x"}), "boom");
        report.apply_defaults("map-widget");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            json!({
                "sender": "map-widget",
                "type": "map.overlay.remove",
                "msg": {"overlayId": "x"},
                "error": "boom"
            })
        );
    }

    #[test]
    fn test_report_requires_type_and_error() {
        let report = ErrorReport::default();
        assert_eq!(report.validate().len(), 2);
    }
}
