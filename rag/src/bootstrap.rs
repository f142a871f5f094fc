//! Startup decision between reusing the persisted index and building a new one.
//!
//! CHECK looks at the store directory, LOAD reads the persisted collection
//! without touching documents or the embedder, BUILD scans, chunks, embeds
//! and persists. A failed LOAD falls back to BUILD; a failed BUILD is fatal.

use tracing::{info, warn};

use crate::chunk_text::chunk_documents;
use crate::config::Config;
use crate::embed_chunks::Embedder;
use crate::error::{RagError, Result};
use crate::retrieve_chunks::VectorIndex;
use crate::scan_files::scan_files;
use crate::store::{IndexStore, StoredChunk};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexOrigin {
    Loaded,
    Built,
}

pub struct Bootstrapped {
    pub index: VectorIndex,
    pub origin: IndexOrigin,
}

pub enum LoadOutcome {
    Loaded(VectorIndex),
    Failed(String),
}

pub fn bootstrap(cfg: &Config, store: &IndexStore, embedder: &dyn Embedder) -> Result<Bootstrapped> {
    if store.is_populated() {
        info!(dir = %store.dir().display(), "existing index detected, loading from storage");
        match load_index(store, embedder.model_name()) {
            LoadOutcome::Loaded(index) => {
                info!(chunks = index.len(), "index loaded");
                return Ok(Bootstrapped {
                    index,
                    origin: IndexOrigin::Loaded,
                });
            }
            LoadOutcome::Failed(reason) => {
                warn!("failed to load existing index: {}", reason);
                info!("building index from scratch");
            }
        }
    } else {
        info!(dir = %store.dir().display(), "no index found, creating embeddings and index");
    }

    let index = build_index(cfg, store, embedder)?;
    Ok(Bootstrapped {
        index,
        origin: IndexOrigin::Built,
    })
}

pub fn load_index(store: &IndexStore, embed_model: &str) -> LoadOutcome {
    match store.load(embed_model) {
        Ok(entries) => LoadOutcome::Loaded(VectorIndex::new(entries)),
        Err(err) => LoadOutcome::Failed(err.to_string()),
    }
}

pub fn build_index(cfg: &Config, store: &IndexStore, embedder: &dyn Embedder) -> Result<VectorIndex> {
    let docs = scan_files(cfg)?;
    info!("{} documents loaded", docs.len());

    let chunks = chunk_documents(&docs, cfg);
    info!("{} chunks created", chunks.len());
    if chunks.is_empty() {
        return Err(RagError::NoDocuments(cfg.source_dir.display().to_string()));
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed(&texts)?;
    if vectors.len() != chunks.len() {
        return Err(RagError::Embedding(format!(
            "expected {} vectors, got {}",
            chunks.len(),
            vectors.len()
        )));
    }
    let dimension = vectors[0].len();
    if dimension == 0 || vectors.iter().any(|v| v.len() != dimension) {
        return Err(RagError::Embedding("inconsistent embedding dimensions".to_string()));
    }

    let entries: Vec<StoredChunk> = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, embedding)| StoredChunk { chunk, embedding })
        .collect();
    store.persist(embedder.model_name(), &entries)?;
    info!(collection = store.collection(), "index created and saved");

    Ok(VectorIndex::new(entries))
}
