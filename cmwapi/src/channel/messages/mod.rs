//! Record schemas for every topic.
//!
//! Each record type carries its topic family's rule table: which fields are
//! filled in when absent ([`Message::apply_defaults`]) and which are required
//! or range-checked ([`Message::validate`]). Wire field names are camelCase.
//!
//! Optional fields are `Option` even when the protocol requires them, so a
//! missing field is reported as a schema violation with the field's name
//! rather than as an opaque decoding failure.

mod error;
mod feature;
mod overlay;
mod status;
mod view;

pub use error::ErrorReport;
pub use feature::{FeaturePlot, FeaturePlotUrl, FeatureSelection, FeatureTarget, FeatureUpdate};
pub use overlay::{OverlayCreate, OverlayTarget, OverlayUpdate};
pub use status::{SelectedFeature, StatusAbout, StatusFormat, StatusRequest, StatusSelected, StatusView};
pub use view::{
    ViewCenterBounds, ViewCenterFeature, ViewCenterLocation, ViewCenterOverlay, ViewClicked,
    ViewZoom,
};

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::validator::ValidationError;

/// A record type that can travel on a [`super::Channel`].
pub trait Message: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Fill absent fields. `sender` is the identity of the widget the record
    /// comes from (the local widget when sending).
    fn apply_defaults(&mut self, sender: &str);

    /// Every violation in the record, checked after defaults are applied.
    fn validate(&self) -> Vec<ValidationError>;
}

/// Fill an absent `overlayId` with the sender's identity.
pub(crate) fn default_overlay_id(overlay_id: &mut Option<String>, sender: &str) {
    if overlay_id.is_none() {
        *overlay_id = Some(sender.to_string());
    }
}

/// Reject an explicitly empty identifier.
pub(crate) fn check_not_empty(
    value: &Option<String>,
    field: &'static str,
    errors: &mut Vec<ValidationError>,
) {
    if value.as_deref() == Some("") {
        errors.push(ValidationError::EmptyField(field));
    }
}
