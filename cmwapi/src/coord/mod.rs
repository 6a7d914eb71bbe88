//! Geographic coordinate primitives
//!
//! Provides the point and bounding-region types used on the wire and by the
//! extent calculator.

mod types;

pub use types::{Bounds, LatLon, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
