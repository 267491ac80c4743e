//! Support ticket lifecycle.
//!
//! A ticket moves `pending -> open -> closing -> deleted`, with
//! `closing -> open` when the closure is cancelled. The registry is the source
//! of truth for every transition; deletion tasks re-check it before acting, so
//! a cancelled or already handled deadline is a no-op.

pub mod platform;
pub mod registry;

use crate::error::Error;
use platform::TicketPlatform;
use registry::{CloseRequest, Reservation, TicketRegistry};
use serenity::all::{ChannelId, GuildId, User, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const CREATE_TICKET_ID: &str = "create_ticket";
pub const CANCEL_CLOSE_ID: &str = "cancel_close";
pub use platform::CLOSE_TICKET_ID;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Created(ChannelId),
    /// The member already has a live ticket (channel unknown while it is
    /// still being created).
    AlreadyOpen(Option<ChannelId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Scheduled { close_at: i64 },
    AlreadyClosing { close_at: i64 },
    NotTracked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    AlreadyGone,
    /// Cancelled, rescheduled or handled by another task.
    Skipped,
}

pub struct TicketManager<P> {
    platform: P,
    registry: TicketRegistry,
    close_delay: Duration,
}

impl<P: TicketPlatform> TicketManager<P> {
    pub fn new(platform: P, registry: TicketRegistry, close_delay: Duration) -> Self {
        Self {
            platform,
            registry,
            close_delay,
        }
    }

    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    /// Open a private ticket channel for `requester`, unless one is live.
    pub async fn open_ticket(
        &self,
        guild_id: GuildId,
        requester: &User,
        bot: UserId,
    ) -> Result<OpenOutcome, Error> {
        let ticket_id = match self
            .registry
            .reserve(guild_id, requester.id, now_millis())
            .await?
        {
            Reservation::Reserved(id) => id,
            Reservation::Existing(Some(channel)) if !self.channel_alive(channel).await? => {
                // Deleted while we were not watching; the slot is free again.
                match self
                    .registry
                    .reserve(guild_id, requester.id, now_millis())
                    .await?
                {
                    Reservation::Reserved(id) => id,
                    Reservation::Existing(channel) => {
                        return Ok(OpenOutcome::AlreadyOpen(channel));
                    }
                }
            }
            Reservation::Existing(channel) => {
                info!(user = %requester.name, ?channel, "Member already has a live ticket");
                return Ok(OpenOutcome::AlreadyOpen(channel));
            }
        };

        let name = platform::channel_name(&requester.name);
        let channel_id = match self
            .platform
            .create_ticket_channel(guild_id, &name, requester.id, bot)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                if let Err(release_err) = self.registry.release(ticket_id).await {
                    error!(error = %release_err, ticket_id, "Failed to release ticket reservation");
                }
                return Err(e);
            }
        };

        self.registry.activate(ticket_id, channel_id).await?;
        info!(user = %requester.name, channel_id = %channel_id, "Ticket opened");

        if let Err(e) = self.platform.send_welcome(channel_id, requester).await {
            error!(error = %e, channel_id = %channel_id, "Failed to send ticket welcome message");
        }

        Ok(OpenOutcome::Created(channel_id))
    }

    /// Start the close countdown for the ticket living in `channel_id`.
    ///
    /// Records the deadline only. The caller acknowledges the member first and
    /// then hands the deadline to [`TicketManager::schedule_deletion`].
    pub async fn close_ticket(&self, channel_id: ChannelId) -> Result<CloseOutcome, Error> {
        let now = now_millis();
        let close_at = now + duration_millis(self.close_delay);

        match self.registry.begin_close(channel_id, now, close_at).await? {
            CloseRequest::Scheduled => {
                info!(channel_id = %channel_id, close_at, "Ticket closing");
                Ok(CloseOutcome::Scheduled { close_at })
            }
            CloseRequest::AlreadyClosing { close_at } => {
                debug!(channel_id = %channel_id, "Close requested twice");
                Ok(CloseOutcome::AlreadyClosing { close_at })
            }
            CloseRequest::NotTracked => {
                warn!(channel_id = %channel_id, "Close requested outside a tracked ticket");
                Ok(CloseOutcome::NotTracked)
            }
        }
    }

    /// Abort a pending closure. Returns false if the ticket was not closing.
    pub async fn cancel_close(&self, channel_id: ChannelId) -> Result<bool, Error> {
        let cancelled = self.registry.cancel_close(channel_id).await?;
        if cancelled {
            info!(channel_id = %channel_id, "Ticket closure cancelled");
        }
        Ok(cancelled)
    }

    /// Record that a channel disappeared without going through the bot.
    pub async fn channel_deleted(&self, channel_id: ChannelId) -> Result<(), Error> {
        if self.registry.forget_channel(channel_id).await? {
            info!(channel_id = %channel_id, "Ticket channel deleted externally");
        }
        Ok(())
    }

    /// Delete the channel if its ticket is still closing with a deadline at
    /// or before `deadline`.
    pub async fn run_deletion(&self, channel_id: ChannelId, deadline: i64) -> Result<Deletion, Error> {
        let due_by = deadline.max(now_millis());
        if !self.registry.claim_deletion(channel_id, due_by).await? {
            debug!(channel_id = %channel_id, "Ticket no longer closing, deletion skipped");
            return Ok(Deletion::Skipped);
        }

        match self.platform.delete_channel(channel_id).await {
            Ok(true) => {
                info!(channel_id = %channel_id, "Ticket channel deleted");
                Ok(Deletion::Deleted)
            }
            Ok(false) => {
                debug!(channel_id = %channel_id, "Ticket channel was already gone");
                Ok(Deletion::AlreadyGone)
            }
            Err(e) => {
                // Retried by the next startup sweep or another close press.
                self.registry.restore_closing(channel_id, now_millis()).await?;
                Err(e)
            }
        }
    }

    /// Clear stale reservations, drop tickets whose channel vanished while
    /// offline, and reschedule every pending deletion. Overdue deletions run
    /// immediately.
    pub async fn recover(self: &Arc<Self>) -> Result<usize, Error> {
        self.registry.clear_stale_reservations().await?;

        for channel_id in self.registry.live_channels().await? {
            self.channel_alive(channel_id).await?;
        }

        let pending = self.registry.pending_closes().await?;
        for &(channel_id, close_at) in &pending {
            self.schedule_deletion(channel_id, close_at);
        }
        info!(count = pending.len(), "Rescheduled pending ticket deletions");
        Ok(pending.len())
    }

    /// Whether the ticket channel still exists. A vanished channel is
    /// forgotten. Lookup failures count as alive.
    async fn channel_alive(&self, channel_id: ChannelId) -> Result<bool, Error> {
        match self.platform.channel_exists(channel_id).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                if self.registry.forget_channel(channel_id).await? {
                    info!(channel_id = %channel_id, "Ticket channel no longer exists");
                }
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, channel_id = %channel_id, "Could not check ticket channel");
                Ok(true)
            }
        }
    }

    /// Spawn the task that deletes the channel once `close_at` has passed.
    pub fn schedule_deletion(self: &Arc<Self>, channel_id: ChannelId, close_at: i64) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let wait = u64::try_from(close_at - now_millis()).unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(wait)).await;
            if let Err(e) = manager.run_deletion(channel_id, close_at).await {
                error!(error = %e, channel_id = %channel_id, "Failed to delete ticket channel");
            }
        });
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX / 2)
}

#[cfg(test)]
pub(crate) fn test_user(id: u64, name: &str) -> User {
    serde_json::from_value(serde_json::json!({
        "id": id.to_string(),
        "username": name,
        "discriminator": "0",
        "avatar": null,
    }))
    .expect("valid user payload")
}
