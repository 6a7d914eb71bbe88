//! Pure validation predicates for message fields.
//!
//! Every function here is stateless and returns `Ok(())` or the first
//! [`ValidationError`] found for the value it inspects. Message schemas in
//! [`crate::channel::messages`] combine them and collect every violation of a
//! record.

mod types;

pub use types::{
    ValidationError, Zoom, CLICK_BUTTONS, CLICK_KEYS, CLICK_TYPES, STATUS_TYPES, WIDGET_TYPES,
    ZOOM_AUTO,
};

use crate::coord::{Bounds, LatLon, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Validates a latitude/longitude pair.
#[inline]
pub fn validate_lat_lon(point: &LatLon) -> Result<(), ValidationError> {
    if !point.lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&point.lat) {
        return Err(ValidationError::InvalidLatitude(point.lat));
    }
    if !point.lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&point.lon) {
        return Err(ValidationError::InvalidLongitude(point.lon));
    }
    Ok(())
}

/// Validates both corners of a bounding region.
///
/// The south-west corner must be south and west of the north-east corner;
/// regions crossing the antimeridian are rejected.
pub fn validate_bounds(bounds: &Bounds) -> Result<(), ValidationError> {
    validate_lat_lon(&bounds.south_west)?;
    validate_lat_lon(&bounds.north_east)?;
    if bounds.south_west.lat > bounds.north_east.lat {
        return Err(ValidationError::InvertedBounds {
            south: bounds.south_west.lat,
            north: bounds.north_east.lat,
        });
    }
    if bounds.south_west.lon > bounds.north_east.lon {
        return Err(ValidationError::WrappedBounds {
            west: bounds.south_west.lon,
            east: bounds.north_east.lon,
        });
    }
    Ok(())
}

/// Validates a camera range: finite and strictly positive.
#[inline]
pub fn validate_range(range: f64) -> Result<(), ValidationError> {
    if range.is_finite() && range > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidRange(range))
    }
}

/// Validates a zoom request: a positive number or the `"auto"` token.
pub fn validate_zoom(zoom: &Zoom) -> Result<(), ValidationError> {
    match zoom {
        Zoom::Range(r) if r.is_finite() && *r > 0.0 => Ok(()),
        Zoom::Token(t) if t == ZOOM_AUTO => Ok(()),
        other => Err(ValidationError::InvalidZoom(other.to_string())),
    }
}

/// Validates that `value` is one of `allowed`.
pub fn validate_one_of(
    field: &'static str,
    value: &str,
    allowed: &[&str],
) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::NotInSet {
            field,
            value: value.to_string(),
            allowed: allowed.join(", "),
        })
    }
}

/// Validates a widget type against [`WIDGET_TYPES`].
#[inline]
pub fn validate_widget_type(value: &str) -> Result<(), ValidationError> {
    validate_one_of("type", value, &WIDGET_TYPES)
}

/// Returns the value of a required field, or a `MissingField` error.
#[inline]
pub fn require<'a, T>(value: &'a Option<T>, field: &'static str) -> Result<&'a T, ValidationError> {
    value.as_ref().ok_or(ValidationError::MissingField(field))
}

/// Like [`require`] for string fields, also rejecting empty strings.
pub fn require_non_empty<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    match value.as_deref() {
        None => Err(ValidationError::MissingField(field)),
        Some("") => Err(ValidationError::EmptyField(field)),
        Some(v) => Ok(v),
    }
}
