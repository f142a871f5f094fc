//! Directory-backed index store.
//!
//! One JSON file per collection under the store directory holds every
//! chunk together with its embedding, plus the embedding model and vector
//! dimension the file was built with.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chunk_text::Chunk;
use crate::config::Config;
use crate::error::{RagError, Result};

pub const STORE_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct CollectionFile {
    version: u32,
    embed_model: String,
    dimension: usize,
    chunks: Vec<StoredChunk>,
}

#[derive(Clone, Debug)]
pub struct IndexStore {
    dir: PathBuf,
    collection: String,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            collection: collection.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.store_dir.clone(), cfg.collection.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.collection))
    }

    /// True when the store directory exists and has at least one entry.
    pub fn is_populated(&self) -> bool {
        fs::read_dir(&self.dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    /// Reads and validates the collection written by the given embedding model.
    pub fn load(&self, embed_model: &str) -> Result<Vec<StoredChunk>> {
        let path = self.collection_path();
        let raw = fs::read_to_string(&path)
            .map_err(|e| RagError::io(path.display().to_string(), e))?;
        let file: CollectionFile = serde_json::from_str(&raw)
            .map_err(|e| RagError::Store(format!("{}: {}", path.display(), e)))?;

        if file.version != STORE_FORMAT_VERSION {
            return Err(RagError::Store(format!(
                "unsupported format version {} (expected {})",
                file.version, STORE_FORMAT_VERSION
            )));
        }
        if file.embed_model != embed_model {
            return Err(RagError::Store(format!(
                "collection built with {}, configured model is {}",
                file.embed_model, embed_model
            )));
        }
        if file.chunks.is_empty() {
            return Err(RagError::Store("collection has no chunks".to_string()));
        }
        if file.dimension == 0 {
            return Err(RagError::Store("collection dimension is zero".to_string()));
        }
        if let Some(bad) = file.chunks.iter().find(|c| c.embedding.len() != file.dimension) {
            return Err(RagError::Store(format!(
                "chunk {} has dimension {}, expected {}",
                bad.chunk.id,
                bad.embedding.len(),
                file.dimension
            )));
        }
        Ok(file.chunks)
    }

    /// Writes the collection, replacing any previous one.
    pub fn persist(&self, embed_model: &str, chunks: &[StoredChunk]) -> Result<()> {
        let dimension = chunks.first().map(|c| c.embedding.len()).unwrap_or(0);
        fs::create_dir_all(&self.dir)
            .map_err(|e| RagError::io(self.dir.display().to_string(), e))?;

        let file = CollectionFile {
            version: STORE_FORMAT_VERSION,
            embed_model: embed_model.to_string(),
            dimension,
            chunks: chunks.to_vec(),
        };
        let body = serde_json::to_vec(&file).map_err(|e| RagError::Store(e.to_string()))?;

        let path = self.collection_path();
        let tmp = self.dir.join(format!(".{}.json.tmp", self.collection));
        fs::write(&tmp, body).map_err(|e| RagError::io(tmp.display().to_string(), e))?;
        fs::rename(&tmp, &path).map_err(|e| RagError::io(path.display().to_string(), e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: &str, embedding: Vec<f32>) -> StoredChunk {
        StoredChunk {
            chunk: Chunk {
                id: id.to_string(),
                source: "files/livro.txt".to_string(),
                position: 0,
                text: "texto".to_string(),
            },
            embedding,
        }
    }

    #[test]
    fn empty_or_missing_directory_is_not_populated() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("storage"), "c");
        assert!(!store.is_populated());
        fs::create_dir(store.dir()).unwrap();
        assert!(!store.is_populated());
        fs::write(store.dir().join("junk"), "x").unwrap();
        assert!(store.is_populated());
    }

    #[test]
    fn persists_then_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path().join("storage"), "c");
        let chunks = vec![stored("a#0", vec![1.0, 0.0]), stored("a#1", vec![0.0, 1.0])];
        store.persist("m", &chunks).unwrap();
        assert!(store.is_populated());
        assert_eq!(store.load("m").unwrap(), chunks);
        assert!(!dir.path().join("storage").join(".c.json.tmp").exists());
    }

    #[test]
    fn rejects_model_mismatch_and_ragged_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path(), "c");
        store.persist("m", &[stored("a#0", vec![1.0, 0.0])]).unwrap();
        assert!(matches!(store.load("other"), Err(RagError::Store(_))));

        store
            .persist("m", &[stored("a#0", vec![1.0, 0.0]), stored("a#1", vec![1.0])])
            .unwrap();
        let err = store.load("m").unwrap_err();
        assert!(err.to_string().contains("a#1"));
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path(), "c");
        fs::write(dir.path().join("c.json"), "{not json").unwrap();
        assert!(matches!(store.load("m"), Err(RagError::Store(_))));
    }
}
