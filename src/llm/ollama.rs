use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::provider::{Embedder, LanguageModel};
use super::types::{ChatMessage, GenerateRequest};
use crate::core::errors::{RagError, Result};

/// Connection settings for an Ollama server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    /// Chat model used to answer
    pub model: String,
    /// Model used for chunk and query embeddings
    pub embedding_model: String,
    pub timeout_secs: u64,
    /// Sampling seed sent in deterministic mode
    pub seed: u64,
    pub max_tokens: Option<u32>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            timeout_secs: 120,
            seed: 0,
            max_tokens: None,
        }
    }
}

#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: Client,
    model: String,
    embedding_model: String,
    seed: u64,
    timeout: Duration,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::invalid_config)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            model: config.model.clone(),
            embedding_model: config.embedding_model.clone(),
            seed: config.seed,
            timeout,
        })
    }

    fn chat_body(&self, request: &GenerateRequest) -> Value {
        let mut options = serde_json::Map::new();
        if request.deterministic {
            options.insert("temperature".to_string(), json!(0.0));
            options.insert("seed".to_string(), json!(self.seed));
        }
        if let Some(n) = request.max_tokens {
            options.insert("num_predict".to_string(), json!(n));
        }

        json!({
            "model": self.model,
            "messages": [ChatMessage::user(request.prompt.clone())],
            "stream": false,
            "options": options,
        })
    }

    fn model_error(&self, err: reqwest::Error) -> RagError {
        if err.is_timeout() {
            RagError::ModelTimeout(self.timeout)
        } else {
            RagError::model(err)
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl Embedder for OllamaProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::embedder("Ollama returned no embedding"))
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        let body = EmbedRequest {
            model: &self.embedding_model,
            input: inputs,
        };

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(RagError::embedder)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::EmbedderUnavailable(format!(
                "Ollama embed error ({}): {}",
                status, text
            )));
        }

        let payload: EmbedResponse = res.json().await.map_err(RagError::embedder)?;
        if payload.embeddings.len() != inputs.len() {
            return Err(RagError::EmbedderUnavailable(format!(
                "Ollama returned {} embeddings for {} inputs",
                payload.embeddings.len(),
                inputs.len()
            )));
        }

        Ok(payload.embeddings)
    }
}

#[async_trait]
impl LanguageModel for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.chat_body(&request);

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.model_error(e))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::ModelUnavailable(format!(
                "Ollama chat error ({}): {}",
                status, text
            )));
        }

        let payload: ChatResponse = res.json().await.map_err(|e| self.model_error(e))?;
        Ok(payload.message.content)
    }
}
