use std::sync::Arc;

use tracing::debug;

use crate::build_prompt::build_prompt_with_context;
use crate::embed_chunks::Embedder;
use crate::embed_query::embed_query;
use crate::error::Result;
use crate::generate::ChatModel;
use crate::retrieve_chunks::VectorIndex;

/// Anything that turns a question into an answer.
pub trait Answerer: Send + Sync {
    fn answer(&self, question: &str) -> Result<String>;
}

/// Retrieval-augmented chat over a ready index. Every call is independent.
pub struct ChatEngine {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn ChatModel>,
    system_prompt: String,
    top_k: usize,
}

impl ChatEngine {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn ChatModel>,
        system_prompt: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            llm,
            system_prompt: system_prompt.into(),
            top_k,
        }
    }
}

impl Answerer for ChatEngine {
    fn answer(&self, question: &str) -> Result<String> {
        let query_vec = embed_query(self.embedder.as_ref(), question)?;
        let hits = self.index.retrieve_top(&query_vec, self.top_k);
        debug!(hits = hits.len(), "retrieved context");
        let messages = build_prompt_with_context(&self.system_prompt, question, &hits);
        self.llm.complete(&messages)
    }
}
