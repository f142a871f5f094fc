use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::scan_files::SourceDocument;

/// A bounded slice of one source document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub source: String,
    pub position: usize,
    pub text: String,
}

/// Splits one document into fixed windows of `chunk_size` characters,
/// stepping back `chunk_overlap` characters between windows. A size of 0
/// keeps the whole document as one chunk.
pub fn chunk_document(doc: &SourceDocument, cfg: &Config) -> Vec<Chunk> {
    let (size, overlap) = window_shape(cfg);
    let text = doc.text.as_str();
    // Byte offset of every char boundary, so windows count characters.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let len_chars = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < len_chars {
        let end = match size {
            0 => len_chars,
            n => (start + n).min(len_chars),
        };
        let window = text[bounds[start]..bounds[end]].trim();
        if !window.is_empty() {
            let position = chunks.len();
            chunks.push(Chunk {
                id: format!("{}#{}", doc.path, position),
                source: doc.path.clone(),
                position,
                text: window.to_string(),
            });
        }
        if end == len_chars {
            break;
        }
        start = end - overlap;
    }
    chunks
}

pub fn chunk_documents(docs: &[SourceDocument], cfg: &Config) -> Vec<Chunk> {
    docs.iter().flat_map(|doc| chunk_document(doc, cfg)).collect()
}

/// Overlap must stay below the window size or the loop would not advance.
fn window_shape(cfg: &Config) -> (usize, usize) {
    let size = cfg.chunk_size;
    let overlap = match size {
        0 => 0,
        n if cfg.chunk_overlap >= n => n / 4,
        _ => cfg.chunk_overlap,
    };
    (size, overlap)
}
