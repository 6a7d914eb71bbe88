//! Validation error and value types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The literal token that asks the map to pick a zoom level that fits.
pub const ZOOM_AUTO: &str = "auto";

/// Widget types a map may report in `map.status.about`.
pub const WIDGET_TYPES: [&str; 3] = ["2-D", "3-D", "other"];

/// Status categories that can be requested through `map.status.request`.
pub const STATUS_TYPES: [&str; 4] = ["about", "format", "selected", "view"];

/// Mouse buttons reported by `map.view.clicked`.
pub const CLICK_BUTTONS: [&str; 3] = ["left", "middle", "right"];

/// Click kinds reported by `map.view.clicked`.
pub const CLICK_TYPES: [&str; 2] = ["single", "double"];

/// Modifier keys reported by `map.view.clicked`.
pub const CLICK_KEYS: [&str; 4] = ["alt", "ctrl", "shift", "none"];

/// Requested zoom for the `map.view.center.*` topics.
///
/// On the wire this is either a positive number (camera altitude in meters)
/// or the literal string `"auto"`. Any other string survives decoding so the
/// validator can report it instead of a generic parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Zoom {
    /// Camera altitude in meters
    Range(f64),
    /// Token form; only `"auto"` is valid
    Token(String),
}

impl Zoom {
    /// The valid `"auto"` zoom.
    pub fn auto() -> Self {
        Zoom::Token(ZOOM_AUTO.to_string())
    }

    /// True for the `"auto"` token.
    pub fn is_auto(&self) -> bool {
        matches!(self, Zoom::Token(t) if t == ZOOM_AUTO)
    }

    /// Altitude in meters, if this is a numeric zoom.
    pub fn range(&self) -> Option<f64> {
        match self {
            Zoom::Range(r) => Some(*r),
            Zoom::Token(_) => None,
        }
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zoom::Range(r) => write!(f, "{}", r),
            Zoom::Token(t) => write!(f, "'{}'", t),
        }
    }
}

/// A single schema violation found in a message record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is absent
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A field is present but empty
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// Latitude outside -90..=90
    #[error("invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    /// Longitude outside -180..=180
    #[error("invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    /// South-west corner lies north of the north-east corner
    #[error("invalid bounds: south-west latitude {south} is north of north-east latitude {north}")]
    InvertedBounds { south: f64, north: f64 },

    /// South-west corner lies east of the north-east corner
    #[error("invalid bounds: south-west longitude {west} is east of north-east longitude {east}")]
    WrappedBounds { west: f64, east: f64 },

    /// Range (altitude) must be a positive finite number
    #[error("invalid range: {0} (must be a positive number)")]
    InvalidRange(f64),

    /// Zoom is neither a positive number nor "auto"
    #[error("invalid zoom: {0} (must be a positive number or 'auto')")]
    InvalidZoom(String),

    /// Value is not one of an enumerated set
    #[error("invalid {field}: '{value}' (must be one of: {allowed})")]
    NotInSet {
        field: &'static str,
        value: String,
        allowed: String,
    },

    /// Record could not be decoded into the topic's schema
    #[error("malformed record: {0}")]
    Malformed(String),
}
