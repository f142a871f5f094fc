use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const HUGGING_API_KEY: &str = "HUGGING_API_KEY";
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";

pub const DEFAULT_SYSTEM_PROMPT: &str = "Você é um professor universitário que responde perguntas com clareza sobre algoritmos genéticos, \
seu fundamento é no livro Algoritmos Genéticos, por Ricardo Linden, \
você deve responder às perguntas em português do Brasil, de forma didática e acadêmica.";

#[derive(Clone)]
pub struct Config {
    pub source_dir: PathBuf,
    pub include_exts: Vec<String>,
    pub recursive: bool,
    pub max_file_bytes: u64,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub store_dir: PathBuf,
    pub collection: String,
    pub top_k: usize,
    pub hf_api_key: Option<String>,
    pub hf_embed_url: String,
    pub embed_model: String,
    pub embed_batch: usize,
    pub groq_api_key: Option<String>,
    pub groq_url: String,
    pub chat_model: String,
    pub system_prompt: String,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        // Load .env if present so keys work without manual `source .env`.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset or blank keys
    /// fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let include_exts = get("RAG_INCLUDE_EXTS")
            .unwrap_or_else(|| ".txt,.md,.markdown,.rst,.html,.csv,.json,.pdf".to_string());

        Self {
            source_dir: get("RAG_SOURCE_DIR").unwrap_or_else(|| "files".to_string()).into(),
            include_exts: include_exts
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            recursive: get("RAG_RECURSIVE")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            max_file_bytes: parse(get("RAG_MAX_FILE_BYTES")).unwrap_or(50_000_000),
            chunk_size: parse(get("RAG_CHUNK_SIZE")).unwrap_or(1000),
            chunk_overlap: parse(get("RAG_CHUNK_OVERLAP")).unwrap_or(0),
            store_dir: get("RAG_STORE_DIR").unwrap_or_else(|| "./storage".to_string()).into(),
            collection: get("RAG_COLLECTION")
                .map(|v| sanitize_collection_name(&v))
                .unwrap_or_else(|| "documentos_llm".to_string()),
            top_k: parse(get("RAG_TOP_K")).unwrap_or(2),
            hf_api_key: get(HUGGING_API_KEY),
            hf_embed_url: get("HF_EMBED_URL")
                .unwrap_or_else(|| "https://router.huggingface.co/hf-inference/models".to_string()),
            embed_model: get("HF_EMBED_MODEL")
                .unwrap_or_else(|| "intfloat/multilingual-e5-large".to_string()),
            embed_batch: parse(get("RAG_EMBED_BATCH")).filter(|n| *n > 0).unwrap_or(16),
            groq_api_key: get(GROQ_API_KEY),
            groq_url: get("GROQ_URL").unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
            chat_model: get("GROQ_CHAT_MODEL")
                .unwrap_or_else(|| "meta-llama/llama-4-scout-17b-16e-instruct".to_string()),
            system_prompt: get("RAG_SYSTEM_PROMPT").unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            http_timeout_secs: parse(get("RAG_HTTP_TIMEOUT_SECS")).unwrap_or(120),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("source_dir", &self.source_dir)
            .field("include_exts", &self.include_exts)
            .field("recursive", &self.recursive)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("store_dir", &self.store_dir)
            .field("collection", &self.collection)
            .field("top_k", &self.top_k)
            .field("hf_api_key", &redact(&self.hf_api_key))
            .field("hf_embed_url", &self.hf_embed_url)
            .field("embed_model", &self.embed_model)
            .field("embed_batch", &self.embed_batch)
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("groq_url", &self.groq_url)
            .field("chat_model", &self.chat_model)
            .field("system_prompt", &self.system_prompt)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Collection names become directory names under the store.
fn sanitize_collection_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' => Some(c),
            '.' => Some('_'),
            c if c.is_ascii_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_tutor_setup() {
        let cfg = from_map(&[]);
        assert_eq!(cfg.source_dir, PathBuf::from("files"));
        assert_eq!(cfg.chunk_size, 1000);
        assert_eq!(cfg.chunk_overlap, 0);
        assert_eq!(cfg.collection, "documentos_llm");
        assert_eq!(cfg.embed_model, "intfloat/multilingual-e5-large");
        assert_eq!(cfg.chat_model, "meta-llama/llama-4-scout-17b-16e-instruct");
        assert_eq!(cfg.top_k, 2);
        assert!(cfg.hf_api_key.is_none());
        assert!(cfg.groq_api_key.is_none());
        assert!(cfg.system_prompt.contains("Ricardo Linden"));
        assert!(!cfg.recursive);
    }

    #[test]
    fn overrides_and_blank_values() {
        let cfg = from_map(&[
            ("RAG_CHUNK_SIZE", "512"),
            ("RAG_TOP_K", "not-a-number"),
            ("GROQ_API_KEY", "   "),
            ("HUGGING_API_KEY", "hf_abc"),
            ("RAG_COLLECTION", "livro linden.v2"),
            ("RAG_INCLUDE_EXTS", ".TXT, .pdf,,"),
            ("RAG_RECURSIVE", "true"),
        ]);
        assert_eq!(cfg.chunk_size, 512);
        assert_eq!(cfg.top_k, 2);
        assert!(cfg.groq_api_key.is_none());
        assert_eq!(cfg.hf_api_key.as_deref(), Some("hf_abc"));
        assert_eq!(cfg.collection, "livro_linden_v2");
        assert_eq!(cfg.include_exts, vec![".txt".to_string(), ".pdf".to_string()]);
        assert!(cfg.recursive);
        assert_eq!(cfg.store_dir, PathBuf::from("./storage"));
    }

    #[test]
    fn collection_names_drop_unsafe_characters() {
        assert_eq!(from_map(&[("RAG_COLLECTION", "../livro/ág")]).collection, "__livrog");
        assert_eq!(from_map(&[("RAG_COLLECTION", "***")]).collection, "default");
    }

    #[test]
    fn debug_output_hides_api_keys() {
        let cfg = from_map(&[
            ("HUGGING_API_KEY", "hf_secret_123"),
            ("GROQ_API_KEY", "gsk_secret_456"),
        ]);
        let printed = format!("{:?}", cfg);
        assert!(!printed.contains("hf_secret_123"));
        assert!(!printed.contains("gsk_secret_456"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("intfloat/multilingual-e5-large"));

        let unset = format!("{:?}", from_map(&[]));
        assert!(unset.contains("groq_api_key: None"));
    }
}
