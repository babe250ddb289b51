//! One-shot question answering over a single web page.
//!
//! fetch -> chunk -> embed -> index -> retrieve -> answer. The first failing
//! stage aborts the run and its error is returned unchanged.

use std::sync::Arc;

use crate::core::errors::{RagError, Result};
use crate::llm::provider::{Embedder, LanguageModel};
use crate::rag::answerer::{AnswerConfig, Answerer};
use crate::rag::chunker::{Chunker, ChunkingConfig};
use crate::rag::fetcher::Fetcher;
use crate::rag::index::VectorIndex;
use crate::rag::retriever::{RetrievalConfig, Retriever};
use crate::rag::types::{Answer, Chunk, EmbeddedChunk, RetrievalResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub answer: AnswerConfig,
    pub max_tokens: Option<u32>,
}

/// Everything a run produced, for callers that want more than the answer.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub chunk_count: usize,
    pub retrieved: RetrievalResult,
    pub answer: Answer,
}

pub struct Pipeline {
    chunker: Chunker,
    retrieval: RetrievalConfig,
    answerer: Answerer,
    fetcher: Arc<dyn Fetcher>,
    embedder: Arc<dyn Embedder>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn Fetcher>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self> {
        if config.retrieval.top_k == 0 {
            return Err(RagError::InvalidConfig(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if config.retrieval.embed_batch_size == 0 {
            return Err(RagError::InvalidConfig(
                "embed_batch_size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            chunker: Chunker::new(config.chunking)?,
            answerer: Answerer::new(model, &config.answer)?.with_max_tokens(config.max_tokens),
            retrieval: config.retrieval,
            fetcher,
            embedder,
        })
    }

    /// Answer `question` from the content at `url`.
    pub async fn run(&self, url: &str, question: &str) -> Result<Answer> {
        Ok(self.run_detailed(url, question).await?.answer)
    }

    pub async fn run_detailed(&self, url: &str, question: &str) -> Result<PipelineOutput> {
        let document = self.fetcher.fetch(url).await?;
        if document.raw_text.trim().is_empty() {
            tracing::warn!("{} has no text content", url);
        }

        let chunks = self.chunker.split(&document.raw_text, &document.source_url);
        let chunk_count = chunks.len();
        tracing::info!(
            "Split {} into {} chunks (size={}, overlap={})",
            url,
            chunk_count,
            self.chunker.config().chunk_size,
            self.chunker.config().chunk_overlap
        );

        let index = self.build_index(chunks).await?;
        tracing::info!(
            "Indexed {} chunks (dimension {:?})",
            index.len(),
            index.dimension()
        );

        let retriever = Retriever::new(index, self.embedder.clone(), self.retrieval.top_k)?;
        let retrieved = retriever.retrieve(question).await?;
        tracing::info!("Retrieved {} chunks for the question", retrieved.len());

        let answer = self.answerer.answer(question, &retrieved).await?;
        tracing::info!("Answer generated ({} chars)", answer.text.chars().count());

        Ok(PipelineOutput {
            chunk_count,
            retrieved,
            answer,
        })
    }

    /// Embed chunks batch by batch, inserting in chunk order.
    async fn build_index(&self, chunks: Vec<Chunk>) -> Result<VectorIndex> {
        let mut index = VectorIndex::new();
        for batch in chunks.chunks(self.retrieval.embed_batch_size) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != batch.len() {
                return Err(RagError::EmbedderUnavailable(format!(
                    "embedder returned {} vectors for {} chunks",
                    vectors.len(),
                    batch.len()
                )));
            }
            for (chunk, vector) in batch.iter().cloned().zip(vectors) {
                index.add(EmbeddedChunk::new(chunk, vector))?;
            }
        }
        Ok(index)
    }
}
