//! Text commands. Matching is exact and case-sensitive; there is no prefix
//! parser and no arguments.

pub mod status;
pub mod ticket;

use serenity::all::{User, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Status,
    Ticket,
}

impl Command {
    pub fn parse(content: &str) -> Option<Self> {
        match content {
            "!status" => Some(Command::Status),
            "!ticket" => Some(Command::Ticket),
            _ => None,
        }
    }
}

/// Messages from bot accounts, ours included, never trigger commands.
pub fn is_from_bot(author: &User, bot_id: UserId) -> bool {
    author.bot || author.id == bot_id
}
