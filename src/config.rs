use crate::error::Error;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite:tickets.db";
const DEFAULT_WEB_PORT: u16 = 3000;
const DEFAULT_INDEX_FILE: &str = "index.html";
const DEFAULT_CLOSE_DELAY_SECS: u64 = 5;
const DEFAULT_ACTIVITY: &str = "SNAC-Hosting Tickets";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub web_port: u16,
    pub index_file: PathBuf,
    pub ticket_close_delay: Duration,
    pub activity: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DISCORD_TOKEN` — Bot token from Discord Developer Portal (`TOKEN` is
    ///   accepted as a fallback)
    ///
    /// Optional:
    /// - `DATABASE_URL` — SQLite connection string (default "sqlite:tickets.db")
    /// - `WEB_PORT` — Port of the landing page server (default 3000)
    /// - `WEB_INDEX_FILE` — File served at `/` (default "index.html")
    /// - `TICKET_CLOSE_DELAY_SECS` — Delay between "Close Ticket" and deletion (default 5)
    /// - `BOT_ACTIVITY` — "Listening to ..." presence text
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = non_empty(lookup("DISCORD_TOKEN"))
            .or_else(|| non_empty(lookup("TOKEN")))
            .ok_or_else(|| Error::Config("DISCORD_TOKEN environment variable is required".into()))?;

        let database_url = non_empty(lookup("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.into());

        let web_port = parse_optional::<u16>("WEB_PORT", lookup("WEB_PORT"))?
            .unwrap_or(DEFAULT_WEB_PORT);

        let index_file = non_empty(lookup("WEB_INDEX_FILE"))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_FILE));

        let delay_secs = parse_optional::<u64>(
            "TICKET_CLOSE_DELAY_SECS",
            lookup("TICKET_CLOSE_DELAY_SECS"),
        )?
        .unwrap_or(DEFAULT_CLOSE_DELAY_SECS);

        let activity =
            non_empty(lookup("BOT_ACTIVITY")).unwrap_or_else(|| DEFAULT_ACTIVITY.into());

        Ok(Self {
            discord_token,
            database_url,
            web_port,
            index_file,
            ticket_close_delay: Duration::from_secs(delay_secs),
            activity,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_optional<T>(var: &str, value: Option<String>) -> Result<Option<T>, Error>
where
    T: std::str::FromStr,
{
    match non_empty(value) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid value for {var}: '{val}'"))),
        None => Ok(None),
    }
}
