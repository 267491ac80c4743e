pub mod interaction;
pub mod message;

use crate::Data;
use serenity::all::{Context, FullEvent, Interaction};
use tracing::error;

/// Route gateway events to the command dispatcher and the ticket workflow.
pub async fn handle_event(ctx: &Context, event: &FullEvent, data: &Data) {
    match event {
        FullEvent::Message { new_message } => {
            message::handle_message(ctx, new_message, data).await;
        }
        FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } => {
            interaction::handle_component(ctx, component, data).await;
        }
        FullEvent::ChannelDelete { channel, .. } => {
            if let Err(e) = data.tickets.channel_deleted(channel.id).await {
                error!(error = %e, channel_id = %channel.id, "Failed to record channel deletion");
            }
        }
        _ => {}
    }
}
