//! Overlay and feature records.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::error::RegistryError;
use crate::render::{LayerHandle, LayerSource};

/// Data formats a feature can be plotted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureFormat {
    Kml,
    GeoJson,
    Wms,
    ArcgisFeature,
    ArcgisDynamicMapService,
    ArcgisImageService,
}

impl FeatureFormat {
    pub const ALL: [FeatureFormat; 6] = [
        FeatureFormat::Kml,
        FeatureFormat::GeoJson,
        FeatureFormat::Wms,
        FeatureFormat::ArcgisFeature,
        FeatureFormat::ArcgisDynamicMapService,
        FeatureFormat::ArcgisImageService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFormat::Kml => "kml",
            FeatureFormat::GeoJson => "geojson",
            FeatureFormat::Wms => "wms",
            FeatureFormat::ArcgisFeature => "arcgis-feature",
            FeatureFormat::ArcgisDynamicMapService => "arcgis-dynamicmapservice",
            FeatureFormat::ArcgisImageService => "arcgis-imageservice",
        }
    }

    /// Whether a layer in this format can be loaded from a URL.
    pub fn supports_url(&self) -> bool {
        !matches!(self, FeatureFormat::GeoJson)
    }

    /// Whether a layer in this format can be built from inline data.
    pub fn supports_inline(&self) -> bool {
        matches!(self, FeatureFormat::Kml | FeatureFormat::GeoJson)
    }
}

impl fmt::Display for FeatureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureFormat {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RegistryError::InvalidDataFormat(s.to_string()))
    }
}

/// Where a feature's content comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureSource {
    Inline(Value),
    Url {
        url: String,
        params: Option<Map<String, Value>>,
    },
}

impl FeatureSource {
    pub(crate) fn to_layer_source(&self) -> LayerSource {
        match self {
            FeatureSource::Inline(data) => LayerSource::Inline { data: data.clone() },
            FeatureSource::Url { url, params } => LayerSource::Url {
                url: url.clone(),
                params: params.clone(),
            },
        }
    }
}

/// Display options for a plot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotOptions {
    /// Display name; defaults to the feature id
    pub name: Option<String>,
    /// Format name as it arrived on the wire
    pub format: String,
    /// Reframe the camera onto the feature once it has loaded
    pub zoom: bool,
}

impl PlotOptions {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            name: None,
            format: format.into(),
            zoom: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn zoom(mut self, zoom: bool) -> Self {
        self.zoom = zoom;
        self
    }
}

/// A plotted item, owned by exactly one overlay.
#[derive(Debug)]
pub struct Feature {
    pub overlay_id: String,
    pub feature_id: String,
    pub name: String,
    pub format: FeatureFormat,
    pub source: FeatureSource,
    pub zoom_on_create: bool,
    pub is_hidden: bool,
    pub is_selected: bool,
    pub selected_id: Option<String>,
    pub selected_name: Option<String>,
    /// Engine layer, given back to the engine when the feature is deleted
    pub render_handle: LayerHandle,
}

/// A named group of features and child overlays.
#[derive(Debug, Default)]
pub struct Overlay {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    /// Ids of linked child overlays
    pub children: BTreeSet<String>,
    pub features: HashMap<String, Feature>,
    pub is_hidden: bool,
}

impl Overlay {
    pub(crate) fn new(id: &str, name: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.unwrap_or(id).to_string(),
            ..Default::default()
        }
    }

    pub fn feature(&self, feature_id: &str) -> Option<&Feature> {
        self.features.get(feature_id)
    }

    /// Features currently selected, ordered by id.
    pub fn selected_features(&self) -> Vec<&Feature> {
        let mut selected: Vec<&Feature> =
            self.features.values().filter(|f| f.is_selected).collect();
        selected.sort_by(|a, b| a.feature_id.cmp(&b.feature_id));
        selected
    }
}

/// Notification that the overlay tree changed shape, membership or
/// visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeChanged;
