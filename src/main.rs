use std::sync::Arc;

use anyhow::{Context, Result};
use rag::{Answerer, Config as RagConfig};
use serenity::Client;
use serenity::all::GatewayIntents;
use tracing::info;

use crate::config::BotConfig;
use crate::handler::Handler;

mod config;
mod handler;
mod logging;
mod pergunta;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    logging::init();

    let bot_cfg = BotConfig::from_env()?;
    let rag_cfg = RagConfig::from_env();

    // Blocking HTTP and file IO; must finish before the gateway connects.
    let (engine, origin) = tokio::task::spawn_blocking(move || rag::init_chat_engine(&rag_cfg))
        .await
        .context("index bootstrap task panicked")?
        .context("failed to prepare the document index")?;
    info!(?origin, "chat engine ready");

    let answerer: Arc<dyn Answerer> = Arc::new(engine);
    let handler = Handler::new(answerer, bot_cfg.guild_id);

    let mut client = Client::builder(&bot_cfg.discord_token, GatewayIntents::non_privileged())
        .event_handler(handler)
        .await
        .context("Error creating client")?;

    client.start().await.context("Discord client error")?;
    Ok(())
}
