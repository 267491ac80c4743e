use crate::tickets::CREATE_TICKET_ID;
use crate::utils::embeds;
use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, CreateMessage};

/// Support panel with the "Open Ticket" button.
pub fn ticket_prompt() -> CreateMessage {
    let embed = embeds::support_embed()
        .title("\u{1F4E9} SNAC-Hosting Support")
        .description("Need help with your server? Click the button below.");

    let open = CreateButton::new(CREATE_TICKET_ID)
        .label("Open Ticket")
        .emoji('\u{1F4E9}')
        .style(ButtonStyle::Primary);

    CreateMessage::new()
        .embed(embed)
        .components(vec![CreateActionRow::Buttons(vec![open])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_open_ticket_button() {
        let json = serde_json::to_value(ticket_prompt()).unwrap();

        assert_eq!(json["embeds"][0]["title"], "\u{1F4E9} SNAC-Hosting Support");
        assert_eq!(json["embeds"][0]["footer"]["text"], "SNAC-Hosting Support");

        let rows = json["components"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        let buttons = rows[0]["components"].as_array().unwrap();
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0]["custom_id"], CREATE_TICKET_ID);
        assert_eq!(buttons[0]["label"], "Open Ticket");
    }
}
