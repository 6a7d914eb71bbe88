//! `map.overlay.*` handlers.

use std::sync::Arc;

use super::Context;
use crate::channel::{Channel, OverlayCreate, OverlayTarget, OverlayUpdate, Topic};
use crate::registry::{Registry, RegistryError};
use crate::render::RenderEngine;

type TargetOp<E> = fn(&mut Registry<E>, &str, &str) -> Result<(), RegistryError>;

pub(super) fn attach<E: RenderEngine + 'static>(ctx: &Arc<Context<E>>) {
    let c = Arc::clone(ctx);
    ctx.channels
        .overlay_create
        .add_handler(move |sender: &str, records: Vec<OverlayCreate>| {
            for record in &records {
                c.apply(Topic::OverlayCreate, record, |registry| {
                    registry.create_overlay(
                        sender,
                        record.overlay_id(),
                        record.name.as_deref(),
                        record.parent_id.as_deref(),
                    )
                });
            }
        });

    let c = Arc::clone(ctx);
    ctx.channels
        .overlay_update
        .add_handler(move |sender: &str, records: Vec<OverlayUpdate>| {
            for record in &records {
                c.apply(Topic::OverlayUpdate, record, |registry| {
                    registry.update_overlay(
                        sender,
                        record.overlay_id(),
                        record.name.as_deref(),
                        record.parent_id.as_deref(),
                    )
                });
            }
        });

    on_target(ctx, &ctx.channels.overlay_remove, Registry::remove_overlay);
    on_target(ctx, &ctx.channels.overlay_hide, Registry::hide_overlay);
    on_target(ctx, &ctx.channels.overlay_show, Registry::show_overlay);
}

/// Handlers whose records only name an overlay.
fn on_target<E: RenderEngine + 'static>(
    ctx: &Arc<Context<E>>,
    channel: &Channel<OverlayTarget>,
    op: TargetOp<E>,
) {
    let c = Arc::clone(ctx);
    let topic = channel.topic();
    channel.add_handler(move |sender: &str, records: Vec<OverlayTarget>| {
        for record in &records {
            c.apply(topic, record, |registry| op(registry, sender, record.overlay_id()));
        }
    });
}
