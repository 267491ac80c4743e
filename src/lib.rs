pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod tickets;
pub mod utils;
pub mod web;

use commands::status::StatusProvider;
use std::sync::Arc;
use tickets::platform::DiscordPlatform;
use tickets::TicketManager;

/// Shared data accessible across all Poise event handlers.
pub struct Data {
    pub tickets: Arc<TicketManager<DiscordPlatform>>,
    pub status: Arc<dyn StatusProvider>,
}
