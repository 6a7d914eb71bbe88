//! Topic names of the map widget protocol.

use std::fmt;
use std::str::FromStr;

/// Every topic a map widget publishes or subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    OverlayCreate,
    OverlayRemove,
    OverlayHide,
    OverlayShow,
    OverlayUpdate,
    FeaturePlot,
    FeaturePlotUrl,
    FeatureUnplot,
    FeatureHide,
    FeatureShow,
    FeatureUpdate,
    FeatureSelected,
    FeatureDeselected,
    ViewZoom,
    ViewCenterOverlay,
    ViewCenterFeature,
    ViewCenterLocation,
    ViewCenterBounds,
    ViewClicked,
    StatusRequest,
    StatusView,
    StatusFormat,
    StatusAbout,
    StatusSelected,
    Error,
}

impl Topic {
    /// All topics, in protocol order.
    pub const ALL: [Topic; 25] = [
        Topic::OverlayCreate,
        Topic::OverlayRemove,
        Topic::OverlayHide,
        Topic::OverlayShow,
        Topic::OverlayUpdate,
        Topic::FeaturePlot,
        Topic::FeaturePlotUrl,
        Topic::FeatureUnplot,
        Topic::FeatureHide,
        Topic::FeatureShow,
        Topic::FeatureUpdate,
        Topic::FeatureSelected,
        Topic::FeatureDeselected,
        Topic::ViewZoom,
        Topic::ViewCenterOverlay,
        Topic::ViewCenterFeature,
        Topic::ViewCenterLocation,
        Topic::ViewCenterBounds,
        Topic::ViewClicked,
        Topic::StatusRequest,
        Topic::StatusView,
        Topic::StatusFormat,
        Topic::StatusAbout,
        Topic::StatusSelected,
        Topic::Error,
    ];

    /// The wire name of the topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::OverlayCreate => "map.overlay.create",
            Topic::OverlayRemove => "map.overlay.remove",
            Topic::OverlayHide => "map.overlay.hide",
            Topic::OverlayShow => "map.overlay.show",
            Topic::OverlayUpdate => "map.overlay.update",
            Topic::FeaturePlot => "map.feature.plot",
            Topic::FeaturePlotUrl => "map.feature.plot.url",
            Topic::FeatureUnplot => "map.feature.unplot",
            Topic::FeatureHide => "map.feature.hide",
            Topic::FeatureShow => "map.feature.show",
            Topic::FeatureUpdate => "map.feature.update",
            Topic::FeatureSelected => "map.feature.selected",
            Topic::FeatureDeselected => "map.feature.deselected",
            Topic::ViewZoom => "map.view.zoom",
            Topic::ViewCenterOverlay => "map.view.center.overlay",
            Topic::ViewCenterFeature => "map.view.center.feature",
            Topic::ViewCenterLocation => "map.view.center.location",
            Topic::ViewCenterBounds => "map.view.center.bounds",
            Topic::ViewClicked => "map.view.clicked",
            Topic::StatusRequest => "map.status.request",
            Topic::StatusView => "map.status.view",
            Topic::StatusFormat => "map.status.format",
            Topic::StatusAbout => "map.status.about",
            Topic::StatusSelected => "map.status.selected",
            Topic::Error => "map.error",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown topic '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_parse_back() {
        let names: HashSet<&str> = Topic::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names.len(), Topic::ALL.len());

        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>(), Ok(topic));
        }
    }

    #[test]
    fn test_unknown_topic() {
        assert!("map.overlay.explode".parse::<Topic>().is_err());
    }
}
