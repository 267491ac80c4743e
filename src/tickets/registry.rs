use serenity::all::{ChannelId, GuildId, UserId};
use sqlx::SqlitePool;
use tracing::{info, warn};

type Result<T> = std::result::Result<T, sqlx::Error>;

/// Outcome of trying to reserve a ticket slot for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Slot reserved; the id must later be activated or released.
    Reserved(i64),
    /// The member already has a live ticket. `None` while its channel is
    /// still being created.
    Existing(Option<ChannelId>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    Scheduled,
    AlreadyClosing { close_at: i64 },
    NotTracked,
}

/// Durable record of live tickets, keyed by (guild, member).
#[derive(Debug, Clone)]
pub struct TicketRegistry {
    pool: SqlitePool,
}

impl TicketRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Reserve the (guild, user) slot before the channel is created.
    pub async fn reserve(&self, guild_id: GuildId, user_id: UserId, now: i64) -> Result<Reservation> {
        let inserted = sqlx::query(
            "INSERT INTO tickets (guild_id, user_id, state, created_at) VALUES (?, ?, 'pending', ?)",
        )
        .bind(to_db(guild_id.get()))
        .bind(to_db(user_id.get()))
        .bind(now)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(result) => Ok(Reservation::Reserved(result.last_insert_rowid())),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                let channel: Option<Option<i64>> = sqlx::query_scalar(
                    "SELECT channel_id FROM tickets \
                     WHERE guild_id = ? AND user_id = ? AND state IN ('pending', 'open', 'closing')",
                )
                .bind(to_db(guild_id.get()))
                .bind(to_db(user_id.get()))
                .fetch_optional(&self.pool)
                .await?;
                Ok(Reservation::Existing(channel.flatten().map(channel_from_db)))
            }
            Err(e) => Err(e),
        }
    }

    /// Attach the created channel to a reservation and mark it open.
    pub async fn activate(&self, ticket_id: i64, channel_id: ChannelId) -> Result<()> {
        sqlx::query("UPDATE tickets SET channel_id = ?, state = 'open' WHERE id = ? AND state = 'pending'")
            .bind(to_db(channel_id.get()))
            .bind(ticket_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop a reservation whose channel could not be created.
    pub async fn release(&self, ticket_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM tickets WHERE id = ? AND state = 'pending'")
            .bind(ticket_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Move an open ticket to closing with the given deadline (unix millis).
    /// A closing ticket whose deadline already passed at `now` (its deletion
    /// failed) gets the new deadline too.
    pub async fn begin_close(
        &self,
        channel_id: ChannelId,
        now: i64,
        close_at: i64,
    ) -> Result<CloseRequest> {
        let updated = sqlx::query(
            "UPDATE tickets SET state = 'closing', close_at = ? \
             WHERE channel_id = ? AND (state = 'open' OR (state = 'closing' AND close_at <= ?))",
        )
        .bind(close_at)
        .bind(to_db(channel_id.get()))
        .bind(now)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() > 0 {
            return Ok(CloseRequest::Scheduled);
        }

        let existing: Option<Option<i64>> = sqlx::query_scalar(
            "SELECT close_at FROM tickets WHERE channel_id = ? AND state = 'closing'",
        )
        .bind(to_db(channel_id.get()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(match existing {
            Some(close_at) => CloseRequest::AlreadyClosing {
                close_at: close_at.unwrap_or_default(),
            },
            None => CloseRequest::NotTracked,
        })
    }

    /// Put a closing ticket back to open. Returns false if it was not closing.
    pub async fn cancel_close(&self, channel_id: ChannelId) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE tickets SET state = 'open', close_at = NULL WHERE channel_id = ? AND state = 'closing'",
        )
        .bind(to_db(channel_id.get()))
        .execute(&self.pool)
        .await?;
        Ok(updated.rows_affected() > 0)
    }

    /// Atomically take ownership of a due deletion. Only one caller wins, and
    /// only while the ticket is still closing and its deadline has passed.
    pub async fn claim_deletion(&self, channel_id: ChannelId, now: i64) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE tickets SET state = 'deleted' \
             WHERE channel_id = ? AND state = 'closing' AND close_at <= ?",
        )
        .bind(to_db(channel_id.get()))
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(updated.rows_affected() > 0)
    }

    /// Return a claimed ticket to closing after a failed deletion.
    pub async fn restore_closing(&self, channel_id: ChannelId, close_at: i64) -> Result<()> {
        sqlx::query(
            "UPDATE tickets SET state = 'closing', close_at = ? WHERE channel_id = ? AND state = 'deleted'",
        )
        .bind(close_at)
        .bind(to_db(channel_id.get()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mark any live ticket using this channel as deleted.
    pub async fn forget_channel(&self, channel_id: ChannelId) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE tickets SET state = 'deleted' \
             WHERE channel_id = ? AND state IN ('open', 'closing')",
        )
        .bind(to_db(channel_id.get()))
        .execute(&self.pool)
        .await?;
        Ok(updated.rows_affected() > 0)
    }

    /// Channels of every open or closing ticket.
    pub async fn live_channels(&self) -> Result<Vec<ChannelId>> {
        let rows: Vec<i64> = sqlx::query_scalar(
            "SELECT channel_id FROM tickets \
             WHERE state IN ('open', 'closing') AND channel_id IS NOT NULL \
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(channel_from_db).collect())
    }

    /// All tickets waiting for deletion, ordered by deadline.
    pub async fn pending_closes(&self) -> Result<Vec<(ChannelId, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT channel_id, close_at FROM tickets \
             WHERE state = 'closing' AND channel_id IS NOT NULL AND close_at IS NOT NULL \
             ORDER BY close_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(channel, close_at)| (channel_from_db(channel), close_at))
            .collect())
    }

    /// Remove reservations left behind by a crash between reserve and
    /// channel creation.
    pub async fn clear_stale_reservations(&self) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM tickets WHERE state = 'pending'")
            .execute(&self.pool)
            .await?
            .rows_affected();
        if deleted > 0 {
            warn!(count = deleted, "Cleared stale ticket reservations");
        } else {
            info!("No stale ticket reservations");
        }
        Ok(deleted)
    }
}

// Discord snowflakes fit in 63 bits.
fn to_db(id: u64) -> i64 {
    id as i64
}

fn channel_from_db(id: i64) -> ChannelId {
    ChannelId::new(id as u64)
}
