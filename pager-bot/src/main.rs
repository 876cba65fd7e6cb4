use std::env;
use std::sync::Arc;

use tracing::{error, info};
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_http::Client;
use twilight_model::gateway::event::Event;

use rustls::crypto::ring::default_provider;

use pager_twilight::ReactionRouter;

mod demo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    // Load the .env file
    dotenvy::dotenv().ok();

    let token = env::var("DISCORD_TOKEN")?;

    // Single shared HTTP client
    let http = Arc::new(Client::new(token.clone()));

    // The router needs the bot's own id to drop self-caused events.
    let current_user = http.current_user().await?.model().await?;
    let router = Arc::new(ReactionRouter::new(current_user.id));

    let intents = Intents::GUILDS
        | Intents::GUILD_MESSAGES
        | Intents::GUILD_MESSAGE_REACTIONS
        | Intents::MESSAGE_CONTENT;

    // A shard is one Gateway WebSocket connection to Discord
    let mut shard = Shard::new(ShardId::new(0, 1), token, intents);

    info!("pager demo is connecting...");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(source) => {
                error!(?source, "gateway event stream error");
                continue;
            }
        };

        match &event {
            Event::Ready(_) => {
                info!("pager demo is ready");
            }
            Event::MessageCreate(msg) => {
                demo::maybe_start_session(Arc::clone(&http), Arc::clone(&router), msg);
            }
            _ => {}
        }

        // Running sessions consume reactions and jump replies from here.
        router.route(&event);
    }

    Ok(())
}
