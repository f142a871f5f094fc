mod bootstrap;
mod build_prompt;
mod chat_engine;
mod chunk_text;
mod config;
mod embed_chunks;
mod embed_query;
mod error;
mod generate;
mod http;
mod retrieve_chunks;
mod scan_files;
mod store;

use std::sync::Arc;

pub use bootstrap::{bootstrap, build_index, load_index, Bootstrapped, IndexOrigin, LoadOutcome};
pub use build_prompt::{build_prompt_with_context, Message};
pub use chat_engine::{Answerer, ChatEngine};
pub use chunk_text::{chunk_document, chunk_documents, Chunk};
pub use config::{Config, DEFAULT_SYSTEM_PROMPT, GROQ_API_KEY, HUGGING_API_KEY};
pub use embed_chunks::{Embedder, HuggingFaceEmbedder};
pub use error::{RagError, Result};
pub use generate::{ChatModel, GroqChat};
pub use retrieve_chunks::{Hit, VectorIndex};
pub use scan_files::{scan_files, SourceDocument};
pub use store::{IndexStore, StoredChunk};

/// Runs the index bootstrap against the remote backends and wires the chat engine.
/// Blocking: call it off the async runtime.
pub fn init_chat_engine(cfg: &Config) -> Result<(ChatEngine, IndexOrigin)> {
    let embedder: Arc<dyn Embedder> = Arc::new(HuggingFaceEmbedder::new(cfg));
    let store = IndexStore::from_config(cfg);
    let Bootstrapped { index, origin } = bootstrap(cfg, &store, embedder.as_ref())?;

    let llm: Arc<dyn ChatModel> = Arc::new(GroqChat::new(cfg));
    let engine = ChatEngine::new(
        Arc::new(index),
        embedder,
        llm,
        cfg.system_prompt.clone(),
        cfg.top_k,
    );
    Ok((engine, origin))
}
