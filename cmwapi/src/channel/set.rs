//! The full set of protocol channels for one widget.

use std::sync::Arc;

use super::channel::Channel;
use super::messages::*;
use super::topic::Topic;
use crate::transport::Transport;

/// Every protocol channel, bound to one transport.
///
/// Topics that share a schema (hide/show/remove, for instance) are separate
/// channels over the same record type.
#[derive(Clone)]
pub struct ChannelSet {
    pub overlay_create: Channel<OverlayCreate>,
    pub overlay_remove: Channel<OverlayTarget>,
    pub overlay_hide: Channel<OverlayTarget>,
    pub overlay_show: Channel<OverlayTarget>,
    pub overlay_update: Channel<OverlayUpdate>,
    pub feature_plot: Channel<FeaturePlot>,
    pub feature_plot_url: Channel<FeaturePlotUrl>,
    pub feature_unplot: Channel<FeatureTarget>,
    pub feature_hide: Channel<FeatureTarget>,
    pub feature_show: Channel<FeatureTarget>,
    pub feature_update: Channel<FeatureUpdate>,
    pub feature_selected: Channel<FeatureSelection>,
    pub feature_deselected: Channel<FeatureSelection>,
    pub view_zoom: Channel<ViewZoom>,
    pub view_center_overlay: Channel<ViewCenterOverlay>,
    pub view_center_feature: Channel<ViewCenterFeature>,
    pub view_center_location: Channel<ViewCenterLocation>,
    pub view_center_bounds: Channel<ViewCenterBounds>,
    pub view_clicked: Channel<ViewClicked>,
    pub status_request: Channel<StatusRequest>,
    pub status_view: Channel<StatusView>,
    pub status_format: Channel<StatusFormat>,
    pub status_about: Channel<StatusAbout>,
    pub status_selected: Channel<StatusSelected>,
    pub error: Channel<ErrorReport>,
    transport: Arc<dyn Transport>,
}

impl ChannelSet {
    /// Bind every channel to `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let t = || Arc::clone(&transport);
        Self {
            overlay_create: Channel::new(t(), Topic::OverlayCreate),
            overlay_remove: Channel::new(t(), Topic::OverlayRemove),
            overlay_hide: Channel::new(t(), Topic::OverlayHide),
            overlay_show: Channel::new(t(), Topic::OverlayShow),
            overlay_update: Channel::new(t(), Topic::OverlayUpdate),
            feature_plot: Channel::new(t(), Topic::FeaturePlot),
            feature_plot_url: Channel::new(t(), Topic::FeaturePlotUrl),
            feature_unplot: Channel::new(t(), Topic::FeatureUnplot),
            feature_hide: Channel::new(t(), Topic::FeatureHide),
            feature_show: Channel::new(t(), Topic::FeatureShow),
            feature_update: Channel::new(t(), Topic::FeatureUpdate),
            feature_selected: Channel::new(t(), Topic::FeatureSelected),
            feature_deselected: Channel::new(t(), Topic::FeatureDeselected),
            view_zoom: Channel::new(t(), Topic::ViewZoom),
            view_center_overlay: Channel::new(t(), Topic::ViewCenterOverlay),
            view_center_feature: Channel::new(t(), Topic::ViewCenterFeature),
            view_center_location: Channel::new(t(), Topic::ViewCenterLocation),
            view_center_bounds: Channel::new(t(), Topic::ViewCenterBounds),
            view_clicked: Channel::new(t(), Topic::ViewClicked),
            status_request: Channel::new(t(), Topic::StatusRequest),
            status_view: Channel::new(t(), Topic::StatusView),
            status_format: Channel::new(t(), Topic::StatusFormat),
            status_about: Channel::new(t(), Topic::StatusAbout),
            status_selected: Channel::new(t(), Topic::StatusSelected),
            error: Channel::new(t(), Topic::Error),
            transport: Arc::clone(&transport),
        }
    }

    /// Identity of the local widget.
    pub fn sender_id(&self) -> &str {
        self.transport.sender_id()
    }

    /// Unsubscribe from every topic.
    pub fn remove_all_handlers(&self) {
        for topic in Topic::ALL {
            self.transport.unsubscribe(topic.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InMemoryBus;

    #[test]
    fn test_channels_bound_to_their_topics() {
        let bus = InMemoryBus::new();
        let set = ChannelSet::new(bus.connect("w"));

        assert_eq!(set.overlay_hide.topic(), Topic::OverlayHide);
        assert_eq!(set.feature_plot_url.topic(), Topic::FeaturePlotUrl);
        assert_eq!(set.status_about.topic(), Topic::StatusAbout);
        assert_eq!(set.error.topic(), Topic::Error);
        assert_eq!(set.sender_id(), "w");
    }

    #[test]
    fn test_remove_all_handlers() {
        let bus = InMemoryBus::new();
        let set = ChannelSet::new(bus.connect("w"));
        set.overlay_create.add_handler(|_, _| {});
        set.view_zoom.add_handler(|_, _| {});

        set.remove_all_handlers();

        assert_eq!(bus.subscriber_count("map.overlay.create"), 0);
        assert_eq!(bus.subscriber_count("map.view.zoom"), 0);
    }
}
