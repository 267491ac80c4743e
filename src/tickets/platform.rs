use crate::error::Error;
use crate::utils::{embeds, permissions};
use async_trait::async_trait;
use serenity::all::{
    ButtonStyle, ChannelId, ChannelType, CreateActionRow, CreateButton, CreateChannel,
    CreateMessage, GuildId, Mentionable, User, UserId,
};
use serenity::http::{Http, HttpError};
use std::sync::Arc;

pub const CLOSE_TICKET_ID: &str = "close_ticket";

/// Channel prefix for ticket channels.
const CHANNEL_PREFIX: &str = "ticket-";
const MAX_CHANNEL_NAME_LEN: usize = 100;

/// The Discord calls the ticket workflow depends on.
#[async_trait]
pub trait TicketPlatform: Send + Sync + 'static {
    /// Create a private text channel visible only to `requester` and `bot`.
    async fn create_ticket_channel(
        &self,
        guild_id: GuildId,
        name: &str,
        requester: UserId,
        bot: UserId,
    ) -> Result<ChannelId, Error>;

    /// Post the greeting with the "Close Ticket" button.
    async fn send_welcome(&self, channel_id: ChannelId, requester: &User) -> Result<(), Error>;

    /// Delete a channel. `Ok(false)` means it was already gone.
    async fn delete_channel(&self, channel_id: ChannelId) -> Result<bool, Error>;

    /// Whether the channel still exists on Discord.
    async fn channel_exists(&self, channel_id: ChannelId) -> Result<bool, Error>;
}

/// Deterministic ticket channel name for a member handle.
pub fn channel_name(handle: &str) -> String {
    let mut name = format!("{CHANNEL_PREFIX}{}", handle.to_lowercase());
    if name.chars().count() > MAX_CHANNEL_NAME_LEN {
        name = name.chars().take(MAX_CHANNEL_NAME_LEN).collect();
    }
    name
}

pub fn welcome_message(requester: &User) -> CreateMessage {
    let embed = embeds::success_embed()
        .title(format!("\u{1F44B} Hello {}", requester.name))
        .description("Support will be with you shortly.\nTo close this ticket, click the button below.");

    let close = CreateButton::new(CLOSE_TICKET_ID)
        .label("Close Ticket")
        .emoji('\u{1F512}')
        .style(ButtonStyle::Danger);

    CreateMessage::new()
        .content(requester.mention().to_string())
        .embed(embed)
        .components(vec![CreateActionRow::Buttons(vec![close])])
}

/// [`TicketPlatform`] backed by the Discord REST API.
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl TicketPlatform for DiscordPlatform {
    async fn create_ticket_channel(
        &self,
        guild_id: GuildId,
        name: &str,
        requester: UserId,
        bot: UserId,
    ) -> Result<ChannelId, Error> {
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Text)
            .permissions(permissions::ticket_overwrites(guild_id, requester, bot));
        let channel = guild_id.create_channel(&self.http, builder).await?;
        Ok(channel.id)
    }

    async fn send_welcome(&self, channel_id: ChannelId, requester: &User) -> Result<(), Error> {
        channel_id
            .send_message(&self.http, welcome_message(requester))
            .await?;
        Ok(())
    }

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<bool, Error> {
        match channel_id.delete(&self.http).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn channel_exists(&self, channel_id: ChannelId) -> Result<bool, Error> {
        match channel_id.to_channel(&self.http).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_not_found(error: &serenity::Error) -> bool {
    matches!(
        error,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) if resp.status_code.as_u16() == 404
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_name_prefixes_handle() {
        assert_eq!(channel_name("steve"), "ticket-steve");
        assert_eq!(channel_name("Steve_01"), "ticket-steve_01");
    }

    #[test]
    fn channel_name_respects_discord_limit() {
        let name = channel_name(&"a".repeat(150));
        assert_eq!(name.chars().count(), 100);
        assert!(name.starts_with("ticket-aaa"));
    }

    #[test]
    fn welcome_mentions_requester_and_offers_close_button() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "42",
            "username": "steve",
            "discriminator": "0",
            "avatar": null,
        }))
        .unwrap();

        let json = serde_json::to_value(welcome_message(&user)).unwrap();
        assert_eq!(json["content"], "<@42>");
        assert_eq!(json["embeds"][0]["title"], "\u{1F44B} Hello steve");
        let button = &json["components"][0]["components"][0];
        assert_eq!(button["custom_id"], CLOSE_TICKET_ID);
        assert_eq!(button["label"], "Close Ticket");
    }
}
