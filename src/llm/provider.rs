use async_trait::async_trait;

use super::types::GenerateRequest;
use crate::core::errors::Result;

/// Maps text to fixed-length vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// embed several texts; output order matches input order
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(inputs.len());
        for input in inputs {
            vectors.push(self.embed(input).await?);
        }
        Ok(vectors)
    }
}

/// Text generation backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// return the provider name (e.g. "ollama")
    fn name(&self) -> &str;

    /// generate a completion for one prompt (non-streaming)
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}
