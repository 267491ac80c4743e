use crate::error::Error;
use crate::tickets::{CloseOutcome, OpenOutcome, CANCEL_CLOSE_ID, CLOSE_TICKET_ID, CREATE_TICKET_ID};
use crate::utils::embeds;
use crate::Data;
use serenity::all::{
    ButtonStyle, ComponentInteraction, Context, CreateActionRow, CreateButton,
    CreateInteractionResponse, CreateInteractionResponseMessage, Mentionable,
};
use std::time::Duration;
use tracing::{debug, error};

/// Handle a button press on one of the ticket controls.
pub async fn handle_component(ctx: &Context, component: &ComponentInteraction, data: &Data) {
    let custom_id = component.data.custom_id.as_str();
    let mut close_at = None;
    let reply = match custom_id {
        CREATE_TICKET_ID => open_ticket(ctx, component, data).await,
        CLOSE_TICKET_ID => close_ticket(component, data).await.map(|(reply, deadline)| {
            close_at = deadline;
            reply
        }),
        CANCEL_CLOSE_ID => cancel_close(component, data).await,
        other => {
            debug!(custom_id = other, "Ignoring unknown component");
            return;
        }
    };

    let reply = reply.unwrap_or_else(|e| {
        error!(
            custom_id,
            user = %component.user.name,
            error = %e,
            "Ticket interaction failed"
        );
        error_reply(&e)
    });

    let response = CreateInteractionResponse::Message(reply);
    if let Err(why) = component.create_response(&ctx.http, response).await {
        error!(custom_id, error = %why, "Failed to answer interaction");
    }

    // Only start the countdown once the member has seen the notice.
    if let Some(close_at) = close_at {
        data.tickets.schedule_deletion(component.channel_id, close_at);
    }
}

async fn open_ticket(
    ctx: &Context,
    component: &ComponentInteraction,
    data: &Data,
) -> Result<CreateInteractionResponseMessage, Error> {
    let guild_id = component.guild_id.ok_or(Error::NotInGuild)?;
    let bot_id = ctx.cache.current_user().id;

    let content = match data
        .tickets
        .open_ticket(guild_id, &component.user, bot_id)
        .await?
    {
        OpenOutcome::Created(channel) => format!("Ticket created: {}", channel.mention()),
        OpenOutcome::AlreadyOpen(Some(channel)) => {
            format!("You already have an open ticket: {}", channel.mention())
        }
        OpenOutcome::AlreadyOpen(None) => {
            "Your ticket is still being created, please wait a moment.".to_string()
        }
    };

    Ok(CreateInteractionResponseMessage::new()
        .content(content)
        .ephemeral(true))
}

/// Returns the reply and, when a countdown started, its deadline.
async fn close_ticket(
    component: &ComponentInteraction,
    data: &Data,
) -> Result<(CreateInteractionResponseMessage, Option<i64>), Error> {
    Ok(
        match data.tickets.close_ticket(component.channel_id).await? {
            CloseOutcome::Scheduled { close_at } => {
                (closing_notice(data.tickets.close_delay()), Some(close_at))
            }
            CloseOutcome::AlreadyClosing { .. } => {
                (notice("This ticket is already closing."), None)
            }
            CloseOutcome::NotTracked => (notice("This channel is not an active ticket."), None),
        },
    )
}

async fn cancel_close(
    component: &ComponentInteraction,
    data: &Data,
) -> Result<CreateInteractionResponseMessage, Error> {
    if data.tickets.cancel_close(component.channel_id).await? {
        Ok(CreateInteractionResponseMessage::new().content("Ticket closure cancelled."))
    } else {
        Ok(notice("This ticket is not closing."))
    }
}

/// Visible countdown message with a "Keep Open" button.
pub fn closing_notice(delay: Duration) -> CreateInteractionResponseMessage {
    let keep_open = CreateButton::new(CANCEL_CLOSE_ID)
        .label("Keep Open")
        .style(ButtonStyle::Secondary);

    CreateInteractionResponseMessage::new()
        .content(format!("Closing ticket in {} seconds...", delay.as_secs()))
        .components(vec![CreateActionRow::Buttons(vec![keep_open])])
}

fn notice(text: &str) -> CreateInteractionResponseMessage {
    CreateInteractionResponseMessage::new()
        .embed(embeds::warning_embed().description(text))
        .ephemeral(true)
}

fn error_reply(error: &Error) -> CreateInteractionResponseMessage {
    let embed = embeds::error_embed()
        .title("Error")
        .description(error.user_message());
    CreateInteractionResponseMessage::new()
        .embed(embed)
        .ephemeral(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPHEMERAL: u64 = 1 << 6;

    #[test]
    fn closing_notice_is_visible_and_cancelable() {
        let json = serde_json::to_value(closing_notice(Duration::from_secs(5))).unwrap();

        assert_eq!(json["content"], "Closing ticket in 5 seconds...");
        assert!(json.get("flags").map_or(true, |f| f.is_null() || f == 0));
        assert_eq!(
            json["components"][0]["components"][0]["custom_id"],
            CANCEL_CLOSE_ID
        );
    }

    #[test]
    fn notices_and_errors_are_ephemeral() {
        let json = serde_json::to_value(notice("This ticket is already closing.")).unwrap();
        assert_eq!(json["flags"].as_u64(), Some(EPHEMERAL));
        assert_eq!(
            json["embeds"][0]["description"],
            "This ticket is already closing."
        );

        let json = serde_json::to_value(error_reply(&Error::NotInGuild)).unwrap();
        assert_eq!(json["flags"].as_u64(), Some(EPHEMERAL));
        assert_eq!(
            json["embeds"][0]["description"],
            "Tickets can only be opened inside a server."
        );
    }
}
