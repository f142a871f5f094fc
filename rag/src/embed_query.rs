use crate::embed_chunks::Embedder;
use crate::error::{RagError, Result};

pub fn embed_query(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>> {
    let vecs = embedder.embed(&[text.to_string()])?;
    vecs.into_iter()
        .next()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RagError::Embedding("empty query embedding".to_string()))
}
