//! `map.feature.*` handlers.

use std::sync::Arc;

use super::Context;
use crate::channel::{
    Channel, FeaturePlot, FeaturePlotUrl, FeatureSelection, FeatureTarget, FeatureUpdate, Topic,
};
use crate::registry::{PlotOptions, Registry, RegistryError};
use crate::render::RenderEngine;

type TargetOp<E> = fn(&mut Registry<E>, &str, &str, &str) -> Result<(), RegistryError>;

fn plot_options(format: &str, name: Option<&str>, zoom: Option<bool>) -> PlotOptions {
    let options = PlotOptions::new(format).zoom(zoom.unwrap_or(false));
    match name {
        Some(name) => options.named(name),
        None => options,
    }
}

pub(super) fn attach<E: RenderEngine + 'static>(ctx: &Arc<Context<E>>) {
    let c = Arc::clone(ctx);
    ctx.channels
        .feature_plot
        .add_handler(move |sender: &str, records: Vec<FeaturePlot>| {
            for record in &records {
                c.apply(Topic::FeaturePlot, record, |registry| {
                    let options =
                        plot_options(record.format(), record.name.as_deref(), record.zoom);
                    let data = record.feature.clone().unwrap_or_default();
                    registry.plot_feature(
                        sender,
                        record.overlay_id(),
                        record.feature_id(),
                        options,
                        data,
                    )?;
                    registry.process_load_events();
                    Ok(())
                });
            }
        });

    let c = Arc::clone(ctx);
    ctx.channels
        .feature_plot_url
        .add_handler(move |sender: &str, records: Vec<FeaturePlotUrl>| {
            for record in &records {
                c.apply(Topic::FeaturePlotUrl, record, |registry| {
                    let options =
                        plot_options(record.format(), record.name.as_deref(), record.zoom);
                    registry.plot_feature_url(
                        sender,
                        record.overlay_id(),
                        record.feature_id(),
                        options,
                        record.url(),
                        record.params.clone(),
                    )?;
                    registry.process_load_events();
                    Ok(())
                });
            }
        });

    let c = Arc::clone(ctx);
    ctx.channels
        .feature_update
        .add_handler(move |sender: &str, records: Vec<FeatureUpdate>| {
            for record in &records {
                c.apply(Topic::FeatureUpdate, record, |registry| {
                    registry.update_feature(
                        sender,
                        record.overlay_id(),
                        record.feature_id(),
                        record.name.as_deref(),
                        record.new_overlay_id.as_deref(),
                    )
                });
            }
        });

    let c = Arc::clone(ctx);
    ctx.channels
        .feature_selected
        .add_handler(move |sender: &str, records: Vec<FeatureSelection>| {
            for record in &records {
                c.apply(Topic::FeatureSelected, record, |registry| {
                    registry.select_feature(
                        sender,
                        record.overlay_id(),
                        record.feature_id(),
                        record.selected_id.as_deref(),
                        record.selected_name.as_deref(),
                    )
                });
            }
        });

    let c = Arc::clone(ctx);
    ctx.channels
        .feature_deselected
        .add_handler(move |sender: &str, records: Vec<FeatureSelection>| {
            for record in &records {
                c.apply(Topic::FeatureDeselected, record, |registry| {
                    registry.deselect_feature(sender, record.overlay_id(), record.feature_id())
                });
            }
        });

    on_target(ctx, &ctx.channels.feature_unplot, Registry::delete_feature);
    on_target(ctx, &ctx.channels.feature_hide, Registry::hide_feature);
    on_target(ctx, &ctx.channels.feature_show, Registry::show_feature);
}

fn on_target<E: RenderEngine + 'static>(
    ctx: &Arc<Context<E>>,
    channel: &Channel<FeatureTarget>,
    op: TargetOp<E>,
) {
    let c = Arc::clone(ctx);
    let topic = channel.topic();
    channel.add_handler(move |sender: &str, records: Vec<FeatureTarget>| {
        for record in &records {
            c.apply(topic, record, |registry| {
                op(registry, sender, record.overlay_id(), record.feature_id())
            });
        }
    });
}
