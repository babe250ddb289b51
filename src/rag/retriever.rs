use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::errors::{RagError, Result};
use crate::llm::provider::Embedder;
use crate::rag::index::VectorIndex;
use crate::rag::types::{Query, RetrievalResult};

/// Configuration for retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the answerer
    pub top_k: usize,
    /// Chunks sent to the embedder per request
    pub embed_batch_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            embed_batch_size: 32,
        }
    }
}

/// Top-k lookup of stored chunks for a query text.
pub struct Retriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
    k: usize,
}

impl Retriever {
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>, k: usize) -> Result<Self> {
        if k == 0 {
            return Err(RagError::InvalidConfig(
                "top_k must be greater than zero".to_string(),
            ));
        }
        Ok(Self { index, embedder, k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Embed the query once and search the index. No caching, no retry.
    pub async fn retrieve(&self, query_text: &str) -> Result<RetrievalResult> {
        let query = Query::new(query_text);
        let vector = self.embedder.embed(&query.text).await?;
        let hits = self.index.query(&vector, self.k)?;
        tracing::debug!(
            "Retrieved {} of {} chunks (k={})",
            hits.len(),
            self.index.len(),
            self.k
        );
        Ok(RetrievalResult::new(hits))
    }
}
