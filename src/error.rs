#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Discord API error: {0}")]
    Discord(#[from] Box<serenity::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Interaction did not come from a guild")]
    NotInGuild,
}

impl From<serenity::Error> for Error {
    fn from(err: serenity::Error) -> Self {
        Error::Discord(Box::new(err))
    }
}

impl Error {
    pub fn user_message(&self) -> &str {
        match self {
            Error::Discord(_) => "Failed to communicate with Discord. Please try again.",
            Error::Config(msg) => msg,
            Error::Database(_) | Error::Migration(_) => {
                "The ticket registry is unavailable. Please try again later."
            }
            Error::Io(_) => "An internal error occurred. Please try again later.",
            Error::NotInGuild => "Tickets can only be opened inside a server.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_surface_their_own_message() {
        let err = Error::Config("WEB_PORT must be a number".into());
        assert_eq!(err.user_message(), "WEB_PORT must be a number");
        assert_eq!(
            err.to_string(),
            "Configuration error: WEB_PORT must be a number"
        );
    }

    #[test]
    fn database_errors_hide_internals_from_users() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert!(!err.user_message().contains("RowNotFound"));
        assert!(err.to_string().starts_with("Database error"));
    }
}
