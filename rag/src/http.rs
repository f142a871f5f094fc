use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::from_str;
use std::time::Duration;

use crate::error::{RagError, Result};

/// Blocking JSON poster shared by the embedding and chat backends. A fresh
/// client is built per request so nothing blocking outlives the worker
/// thread that used it.
#[derive(Clone, Debug)]
pub struct HttpClient {
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        bearer: &str,
        body: &B,
    ) -> Result<T> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| RagError::Http(e.to_string()))?;
        let resp = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", bearer))
            .json(body)
            .send()
            .map_err(|e| RagError::Http(format!("POST {} failed: {}", url, e)))?;
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        if !status.is_success() {
            return Err(RagError::Http(format!(
                "POST {} failed: {} {}",
                url,
                status,
                truncate(&text, 500)
            )));
        }
        from_str::<T>(&text).map_err(|e| {
            RagError::Decode(format!("POST {} decode failed: {} | {}", url, e, truncate(&text, 500)))
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
