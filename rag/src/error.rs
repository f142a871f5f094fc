use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Http(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("no documents found in {0}")]
    NoDocuments(String),

    #[error("index store: {0}")]
    Store(String),

    #[error("embedding: {0}")]
    Embedding(String),

    #[error("llm: {0}")]
    Llm(String),
}

impl RagError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        RagError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RagError>;
