//! `map.status.request` handler.

use std::sync::Arc;

use tracing::{debug, warn};

use super::view::view_status;
use super::Context;
use crate::channel::{
    ChannelError, SelectedFeature, StatusAbout, StatusFormat, StatusRequest, StatusSelected,
    StatusView,
};
use crate::registry::FeatureFormat;
use crate::render::RenderEngine;
use crate::validator::STATUS_TYPES;

/// Everything a status request asked for, gathered under one lock.
#[derive(Default)]
struct Answer {
    view: Option<StatusView>,
    about: Option<StatusAbout>,
    format: Option<StatusFormat>,
    selected: Vec<StatusSelected>,
}

impl<E: RenderEngine> Context<E> {
    fn answer(&self, requester: &str, requested: &[String]) -> Answer {
        let wants = |kind: &str| requested.iter().any(|t| t == kind);
        let registry = self.registry.lock();
        let mut answer = Answer::default();

        for kind in STATUS_TYPES.iter().copied().filter(|k| wants(*k)) {
            match kind {
                "view" => {
                    answer.view = Some(view_status(registry.engine(), Some(requester.to_string())))
                }
                "about" => {
                    answer.about = Some(StatusAbout {
                        version: Some(self.about.version.clone()),
                        kind: Some(self.about.widget_type.clone()),
                        widget_name: Some(self.about.name.clone()),
                    })
                }
                "format" => {
                    answer.format = Some(StatusFormat {
                        formats: Some(
                            FeatureFormat::ALL
                                .iter()
                                .map(|f| f.as_str().to_string())
                                .collect(),
                        ),
                    })
                }
                "selected" => {
                    answer.selected = registry
                        .selected_features()
                        .into_iter()
                        .map(|(overlay, features)| StatusSelected {
                            overlay_id: Some(overlay.id.clone()),
                            selected_features: Some(
                                features
                                    .into_iter()
                                    .map(|f| SelectedFeature {
                                        feature_id: Some(f.feature_id.clone()),
                                        selected_id: f.selected_id.clone(),
                                        selected_name: f.selected_name.clone(),
                                    })
                                    .collect(),
                            ),
                        })
                        .collect()
                }
                _ => {}
            }
        }
        answer
    }

    fn publish(&self, answer: Answer) -> Result<(), ChannelError> {
        if let Some(view) = answer.view {
            self.channels.status_view.send_one(view)?;
        }
        if let Some(about) = answer.about {
            self.channels.status_about.send_one(about)?;
        }
        if let Some(format) = answer.format {
            self.channels.status_format.send_one(format)?;
        }
        for selected in answer.selected {
            self.channels.status_selected.send_one(selected)?;
        }
        Ok(())
    }
}

pub(super) fn attach<E: RenderEngine + 'static>(ctx: &Arc<Context<E>>) {
    let c = Arc::clone(ctx);
    ctx.channels
        .status_request
        .add_handler(move |sender: &str, records: Vec<StatusRequest>| {
            for record in &records {
                debug!(requester = sender, types = ?record.types(), "Status requested");
                let answer = c.answer(sender, record.types());
                if let Err(e) = c.publish(answer) {
                    warn!(requester = sender, error = %e, "Failed to answer status request");
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::adapter::tests::{harness, Harness};
    use crate::transport::Transport;

    #[test]
    fn test_request_without_types_answers_everything() {
        let Harness { bus, peer, .. } = harness();
        peer.publish(
            "map.feature.plot.url",
            json!({"overlayId": "o", "featureId": "f", "url": "http://x/f.kml"}),
        )
        .unwrap();
        peer.publish(
            "map.feature.selected",
            json!({"overlayId": "o", "featureId": "f", "selectedName": "Pin"}),
        )
        .unwrap();

        peer.publish("map.status.request", json!({})).unwrap();

        let view = bus.published_on("map.status.view");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].payload["requester"], "peer");

        let about = bus.published_on("map.status.about");
        assert_eq!(about[0].payload["widgetName"], "cmwapi-map");
        assert_eq!(about[0].payload["type"], "2-D");

        let format = bus.published_on("map.status.format");
        let formats = format[0].payload["formats"].as_array().unwrap();
        assert!(formats.contains(&json!("kml")));
        assert!(formats.contains(&json!("geojson")));

        let selected = bus.published_on("map.status.selected");
        assert_eq!(selected.len(), 1);
        assert_eq!(
            selected[0].payload,
            json!({
                "overlayId": "o",
                "selectedFeatures": [{"featureId": "f", "selectedName": "Pin"}]
            })
        );
    }

    #[test]
    fn test_request_only_named_types() {
        let Harness { bus, peer, .. } = harness();

        peer.publish("map.status.request", json!({"types": ["about"]}))
            .unwrap();

        assert_eq!(bus.published_on("map.status.about").len(), 1);
        assert!(bus.published_on("map.status.view").is_empty());
        assert!(bus.published_on("map.status.format").is_empty());
        assert!(bus.published_on("map.status.selected").is_empty());
    }

    #[test]
    fn test_unknown_type_rejects_request() {
        let Harness { bus, peer, .. } = harness();

        peer.publish("map.status.request", json!({"types": ["weather"]}))
            .unwrap();

        assert!(bus.published_on("map.status.about").is_empty());
        assert_eq!(bus.published_on("map.error").len(), 1);
    }
}
