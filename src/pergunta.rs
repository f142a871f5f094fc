//! The `/pergunta` slash command.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rag::Answerer;
use serenity::all::{
    CommandDataOption, CommandOptionType, CreateAllowedMentions, CreateCommand, CreateCommandOption,
    CreateInteractionResponseFollowup,
};
use tracing::{error, info};

pub const NAME: &str = "pergunta";
pub const QUESTION_OPTION: &str = "ag";

/// Discord rejects messages above this many characters.
const MAX_MESSAGE_CHARS: usize = 2000;

/// Where a command's answer goes.
#[async_trait]
pub trait Reply: Send + Sync {
    /// Deferred "thinking" acknowledgement, sent before any work starts.
    async fn acknowledge(&self) -> Result<()>;

    async fn send(&self, content: String) -> Result<()>;
}

pub fn register() -> CreateCommand {
    CreateCommand::new(NAME)
        .description("Pergunte algo com base nos documentos")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, QUESTION_OPTION, "Digite sua pergunta")
                .required(true),
        )
}

pub fn question_option(options: &[CommandDataOption]) -> Option<String> {
    options
        .iter()
        .find(|o| o.name == QUESTION_OPTION)
        .and_then(|o| o.value.as_str())
        .map(str::to_string)
}

/// The question is echoed verbatim, so the reply must not ping anyone.
pub fn followup(content: String) -> CreateInteractionResponseFollowup {
    CreateInteractionResponseFollowup::new()
        .content(content)
        .allowed_mentions(CreateAllowedMentions::new())
}

/// Acknowledge, answer on the blocking pool, then send exactly one follow-up.
pub async fn handle<R: Reply>(answerer: Arc<dyn Answerer>, reply: &R, question: Option<String>) -> Result<()> {
    reply.acknowledge().await.context("failed to acknowledge interaction")?;

    let content = match question {
        Some(question) => {
            info!(question = %question, "answering");
            match answer(answerer, question.clone()).await {
                Ok(answer) => format_answer(&question, &answer),
                Err(err) => {
                    error!("failed to answer: {:#}", err);
                    format_error(&err)
                }
            }
        }
        None => format_error(&anyhow::anyhow!("parâmetro `{}` ausente", QUESTION_OPTION)),
    };

    reply.send(content).await.context("failed to send follow-up")
}

async fn answer(answerer: Arc<dyn Answerer>, question: String) -> Result<String> {
    let answer = tokio::task::spawn_blocking(move || answerer.answer(&question))
        .await
        .context("answer task panicked")??;
    Ok(answer)
}

pub fn format_answer(question: &str, answer: &str) -> String {
    fit_message(format!("**Pergunta:** {}\n**Resposta:** {}", question, answer))
}

pub fn format_error(err: &anyhow::Error) -> String {
    fit_message(format!("Ocorreu um erro: {:#}", err))
}

fn fit_message(text: String) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text;
    }
    let mut out: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    out.push('…');
    out
}
