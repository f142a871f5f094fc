use serde::{Deserialize, Serialize};

use crate::build_prompt::Message;
use crate::config::{Config, GROQ_API_KEY};
use crate::error::{RagError, Result};
use crate::http::HttpClient;

/// Remote chat-completion backend.
pub trait ChatModel: Send + Sync {
    fn complete(&self, messages: &[Message]) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Groq's OpenAI-compatible chat completions endpoint.
pub struct GroqChat {
    http: HttpClient,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl GroqChat {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: HttpClient::new(cfg.http_timeout_secs),
            url: format!("{}/chat/completions", cfg.groq_url.trim_end_matches('/')),
            model: cfg.chat_model.clone(),
            api_key: cfg.groq_api_key.clone(),
        }
    }
}

impl ChatModel for GroqChat {
    fn complete(&self, messages: &[Message]) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RagError::MissingCredential(GROQ_API_KEY))?;
        let req = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };
        let res = self.http.post_json::<ChatResponse, _>(&self.url, api_key, &req)?;
        first_content(res)
    }
}

fn first_content(res: ChatResponse) -> Result<String> {
    let content = res
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(RagError::Llm("empty response from model".to_string()));
    }
    Ok(content)
}
