use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rag::Answerer;
use serenity::all::{Command, CommandInteraction, Context, EventHandler, GuildId, Interaction, Ready};
use tracing::{error, info, warn};

use crate::pergunta::{self, Reply};

pub struct Handler {
    answerer: Arc<dyn Answerer>,
    guild_id: Option<GuildId>,
}

impl Handler {
    pub fn new(answerer: Arc<dyn Answerer>, guild_id: Option<GuildId>) -> Self {
        Self { answerer, guild_id }
    }
}

struct InteractionReply<'a> {
    ctx: &'a Context,
    command: &'a CommandInteraction,
}

#[async_trait]
impl Reply for InteractionReply<'_> {
    async fn acknowledge(&self) -> Result<()> {
        self.command.defer(&self.ctx.http).await?;
        Ok(())
    }

    async fn send(&self, content: String) -> Result<()> {
        self.command
            .create_followup(&self.ctx.http, pergunta::followup(content))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let commands = vec![pergunta::register()];
        let synced = match self.guild_id {
            Some(guild_id) => guild_id.set_commands(&ctx.http, commands).await,
            None => Command::set_global_commands(&ctx.http, commands).await,
        };
        match synced {
            Ok(synced) => {
                let names: Vec<&str> = synced.iter().map(|c| c.name.as_str()).collect();
                info!(guild = ?self.guild_id, "commands synced: {:?}", names);
            }
            Err(why) => error!("failed to sync commands: {:?}", why),
        }
        info!("bot online as {}", ready.user.name);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if command.data.name != pergunta::NAME {
            warn!(name = %command.data.name, "unknown command");
            return;
        }

        let question = pergunta::question_option(&command.data.options);
        let reply = InteractionReply {
            ctx: &ctx,
            command: &command,
        };
        if let Err(why) = pergunta::handle(self.answerer.clone(), &reply, question).await {
            error!(user = %command.user.name, "/{} failed: {:#}", pergunta::NAME, why);
        }
    }
}
