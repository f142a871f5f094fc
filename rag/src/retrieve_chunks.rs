use std::cmp::Ordering;

use crate::chunk_text::Chunk;
use crate::store::StoredChunk;

#[derive(Clone, Debug)]
pub struct Hit {
    pub chunk: Chunk,
    pub score: f32,
}

/// In-memory view of a persisted collection. Read-only once built.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<StoredChunk>,
}

impl VectorIndex {
    pub fn new(entries: Vec<StoredChunk>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn retrieve_top(&self, vector: &[f32], top_k: usize) -> Vec<Hit> {
        if vector.is_empty() || top_k == 0 {
            return vec![];
        }
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.embedding.len() == vector.len())
            .map(|(idx, e)| (idx, cosine_similarity(vector, &e.embedding)))
            .collect();
        scored.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));
        scored
            .into_iter()
            .take(top_k)
            .map(|(idx, score)| Hit {
                chunk: self.entries[idx].chunk.clone(),
                score,
            })
            .collect()
    }
}

fn cosine_similarity(query: &[f32], candidate: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut qn = 0.0f32;
    let mut cn = 0.0f32;
    for (q, c) in query.iter().zip(candidate) {
        dot += q * c;
        qn += q * q;
        cn += c * c;
    }
    let denom = qn.sqrt() * cn.sqrt();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
