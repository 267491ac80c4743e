use crate::commands::{self, status, ticket, Command};
use crate::error::Error;
use crate::Data;
use serenity::all::{Context, CreateMessage, Message};
use tracing::{error, info};

/// Answer `!status` and `!ticket`. Failures are logged; the author just sees
/// no reply.
pub async fn handle_message(ctx: &Context, msg: &Message, data: &Data) {
    let bot_id = ctx.cache.current_user().id;
    if commands::is_from_bot(&msg.author, bot_id) {
        return;
    }

    let Some(command) = Command::parse(&msg.content) else {
        return;
    };

    info!(?command, user = %msg.author.name, channel_id = %msg.channel_id, "Received command");

    if let Err(e) = run_command(ctx, msg, command, data).await {
        error!(?command, error = %e, "Failed to answer command");
    }
}

async fn run_command(
    ctx: &Context,
    msg: &Message,
    command: Command,
    data: &Data,
) -> Result<(), Error> {
    match command {
        Command::Status => {
            let snapshot = data.status.snapshot().await?;
            let reply = CreateMessage::new()
                .embed(status::status_embed(&snapshot))
                .reference_message(msg);
            msg.channel_id.send_message(&ctx.http, reply).await?;
        }
        Command::Ticket => {
            msg.channel_id
                .send_message(&ctx.http, ticket::ticket_prompt())
                .await?;
        }
    }
    Ok(())
}
