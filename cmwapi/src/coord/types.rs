//! Coordinate type definitions

use serde::{Deserialize, Serialize};

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude, positive north
    pub lat: f64,
    /// Longitude, positive east
    pub lon: f64,
}

impl LatLon {
    /// Create a new point.
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A geographic bounding region described by its south-west and north-east
/// corners.
///
/// This is the extent type shared by the wire protocol (`bounds` fields) and
/// the extent calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    /// South-west (minimum) corner
    pub south_west: LatLon,
    /// North-east (maximum) corner
    pub north_east: LatLon,
}

impl Bounds {
    /// Create bounds from corner points.
    #[inline]
    pub fn new(south_west: LatLon, north_east: LatLon) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Create bounds from raw edges.
    #[inline]
    pub fn from_edges(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLon::new(south, west), LatLon::new(north, east))
    }

    /// Smallest bounds covering both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::from_edges(
            self.south_west.lat.min(other.south_west.lat),
            self.south_west.lon.min(other.south_west.lon),
            self.north_east.lat.max(other.north_east.lat),
            self.north_east.lon.max(other.north_east.lon),
        )
    }

    /// Geometric center of the bounds.
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lon + self.north_east.lon) / 2.0,
        )
    }

    /// Latitude span in degrees.
    #[inline]
    pub fn height(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    /// Longitude span in degrees.
    #[inline]
    pub fn width(&self) -> f64 {
        self.north_east.lon - self.south_west.lon
    }

    /// Returns the same-sized bounds moved so its center is `center`.
    pub fn recentered(&self, center: LatLon) -> Bounds {
        let half_height = self.height() / 2.0;
        let half_width = self.width() / 2.0;
        Bounds::from_edges(
            center.lat - half_height,
            center.lon - half_width,
            center.lat + half_height,
            center.lon + half_width,
        )
    }

    /// Returns the bounds with every edge clamped to valid coordinates.
    pub fn clamped(&self) -> Bounds {
        Bounds::from_edges(
            self.south_west.lat.clamp(MIN_LAT, MAX_LAT),
            self.south_west.lon.clamp(MIN_LON, MAX_LON),
            self.north_east.lat.clamp(MIN_LAT, MAX_LAT),
            self.north_east.lon.clamp(MIN_LON, MAX_LON),
        )
    }
}
