use poise::serenity_prelude as serenity;
use snac_bot::commands::status::FixedStatusProvider;
use snac_bot::config::Config;
use snac_bot::error::Error;
use snac_bot::events;
use snac_bot::tickets::platform::DiscordPlatform;
use snac_bot::tickets::registry::TicketRegistry;
use snac_bot::tickets::TicketManager;
use snac_bot::{web, Data};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("snac_bot=info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let registry = match snac_bot::db::init_pool(&config.database_url).await {
        Ok(pool) => TicketRegistry::new(pool),
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            std::process::exit(1);
        }
    };

    // Landing page
    let web_port = config.web_port;
    let index_file = config.index_file.clone();
    tokio::spawn(async move {
        if let Err(e) = web::serve(web_port, index_file, shutdown_signal()).await {
            error!(error = %e, "Landing page server stopped");
        }
    });

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions::<Data, Error> {
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    events::handle_event(ctx, event, data).await;
                    Ok(())
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    if let Err(e) = poise::builtins::on_error(error).await {
                        tracing::error!(error = %e, "Error handling error");
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!(bot = %ready.user.name, guilds = ready.guilds.len(), "Bot is ready!");

                ctx.set_activity(Some(serenity::ActivityData::listening(&config.activity)));

                let platform = DiscordPlatform::new(ctx.http.clone());
                let tickets = Arc::new(TicketManager::new(
                    platform,
                    registry,
                    config.ticket_close_delay,
                ));

                // Deletions scheduled before a restart
                tickets.recover().await?;

                Ok(Data {
                    tickets,
                    status: Arc::new(FixedStatusProvider),
                })
            })
        })
        .build();

    let mut client = match serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create Discord client");
            std::process::exit(1);
        }
    };

    // Graceful shutdown on SIGINT/SIGTERM
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping bot...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!(error = %why, "Client error");
        std::process::exit(1);
    }
    info!("Bot has shut down cleanly");
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
