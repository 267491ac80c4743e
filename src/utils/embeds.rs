use serenity::all::CreateEmbed;

/// SNAC-Hosting colors used across all bot embeds.
pub struct Colors;

impl Colors {
    pub const ONLINE: u32 = 0x00FF00;
    pub const SUPPORT: u32 = 0x0099FF;
    pub const WARNING: u32 = 0xFFD700;
    pub const ERROR: u32 = 0xFF4444;
}

/// Green embed used by the status panel and ticket greetings.
pub fn success_embed() -> CreateEmbed {
    CreateEmbed::default().color(Colors::ONLINE)
}

/// Blue embed with the support footer.
pub fn support_embed() -> CreateEmbed {
    CreateEmbed::default()
        .color(Colors::SUPPORT)
        .footer(serenity::all::CreateEmbedFooter::new("SNAC-Hosting Support"))
}

/// Gold embed for notices such as a ticket being closed.
pub fn warning_embed() -> CreateEmbed {
    CreateEmbed::default().color(Colors::WARNING)
}

/// Create an error-themed embed (red) with a timestamp.
pub fn error_embed() -> CreateEmbed {
    CreateEmbed::default()
        .color(Colors::ERROR)
        .timestamp(serenity::model::Timestamp::now())
}
