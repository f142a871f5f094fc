use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{Config, HUGGING_API_KEY};
use crate::error::{RagError, Result};
use crate::http::HttpClient;

/// Remote embedding backend.
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    /// Returns one vector per input text, in input order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
}

/// Hugging Face inference `feature-extraction` pipeline.
pub struct HuggingFaceEmbedder {
    http: HttpClient,
    url: String,
    model: String,
    api_key: Option<String>,
    batch: usize,
}

impl HuggingFaceEmbedder {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: HttpClient::new(cfg.http_timeout_secs),
            url: format!(
                "{}/{}/pipeline/feature-extraction",
                cfg.hf_embed_url.trim_end_matches('/'),
                cfg.embed_model
            ),
            model: cfg.embed_model.clone(),
            api_key: cfg.hf_api_key.clone(),
            batch: cfg.embed_batch.max(1),
        }
    }
}

impl Embedder for HuggingFaceEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(RagError::MissingCredential(HUGGING_API_KEY))?;

        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch) {
            debug!(model = %self.model, size = batch.len(), "embedding batch");
            let req = FeatureExtractionRequest { inputs: batch };
            let res = self.http.post_json::<Value, _>(&self.url, api_key, &req)?;
            let vectors = parse_embeddings(&res)?;
            if vectors.len() != batch.len() {
                return Err(RagError::Embedding(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            out.extend(vectors);
        }
        Ok(out)
    }
}

/// Accepts a single vector, a batch of vectors, or a batch of token
/// matrices (mean pooled).
pub(crate) fn parse_embeddings(value: &Value) -> Result<Vec<Vec<f32>>> {
    if let Some(err) = value.get("error") {
        return Err(RagError::Embedding(err.to_string()));
    }
    let arr = value
        .as_array()
        .ok_or_else(|| RagError::Embedding("Invalid embeddings format".to_string()))?;
    if arr.is_empty() {
        return Ok(vec![]);
    }
    if !arr[0].is_array() {
        return Ok(vec![parse_vec(value)?]);
    }

    let mut out = Vec::with_capacity(arr.len());
    for row in arr {
        let is_matrix = row
            .as_array()
            .and_then(|r| r.first())
            .map(Value::is_array)
            .unwrap_or(false);
        if is_matrix {
            out.push(mean_pool(row)?);
        } else {
            out.push(parse_vec(row)?);
        }
    }
    Ok(out)
}

fn mean_pool(matrix: &Value) -> Result<Vec<f32>> {
    let rows = matrix
        .as_array()
        .ok_or_else(|| RagError::Embedding("Token matrix is not an array".to_string()))?;
    let mut sum: Vec<f32> = Vec::new();
    for row in rows {
        let v = parse_vec(row)?;
        if sum.is_empty() {
            sum = v;
            continue;
        }
        if v.len() != sum.len() {
            return Err(RagError::Embedding("Ragged token matrix".to_string()));
        }
        for (acc, x) in sum.iter_mut().zip(v) {
            *acc += x;
        }
    }
    let n = rows.len().max(1) as f32;
    Ok(sum.into_iter().map(|x| x / n).collect())
}

fn parse_vec(value: &Value) -> Result<Vec<f32>> {
    let arr = value
        .as_array()
        .ok_or_else(|| RagError::Embedding("Embedding is not an array".to_string()))?;
    let mut out = Vec::with_capacity(arr.len());
    for v in arr {
        let n = v
            .as_f64()
            .ok_or_else(|| RagError::Embedding("Embedding value is not a number".to_string()))?;
        out.push(n as f32);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_single_batch_and_token_shapes() {
        assert_eq!(parse_embeddings(&json!([0.5, 1.0])).unwrap(), vec![vec![0.5, 1.0]]);
        assert_eq!(
            parse_embeddings(&json!([[1.0, 0.0], [0.0, 1.0]])).unwrap(),
            vec![vec![1.0, 0.0], vec![0.0, 1.0]]
        );
        assert_eq!(
            parse_embeddings(&json!([[[1.0, 2.0], [3.0, 4.0]]])).unwrap(),
            vec![vec![2.0, 3.0]]
        );
    }

    #[test]
    fn rejects_error_payloads_and_garbage() {
        let err = parse_embeddings(&json!({"error": "Model is loading"})).unwrap_err();
        assert!(err.to_string().contains("Model is loading"));
        assert!(parse_embeddings(&json!([["x"]])).is_err());
        assert!(parse_embeddings(&json!("nope")).is_err());
    }

    #[test]
    fn missing_key_fails_on_first_use_only() {
        let cfg = Config::from_lookup(|_| None);
        let embedder = HuggingFaceEmbedder::new(&cfg);
        assert!(embedder.embed(&[]).unwrap().is_empty());
        let err = embedder.embed(&["texto".to_string()]).unwrap_err();
        assert!(matches!(err, RagError::MissingCredential(HUGGING_API_KEY)));
    }
}
