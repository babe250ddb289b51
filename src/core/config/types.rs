use serde::{Deserialize, Serialize};

use crate::llm::ollama::OllamaConfig;
use crate::rag::answerer::AnswerConfig;
use crate::rag::chunker::ChunkingConfig;
use crate::rag::fetcher::FetchConfig;
use crate::rag::pipeline::PipelineConfig;
use crate::rag::retriever::RetrievalConfig;

pub const DEFAULT_URL: &str = "https://www.flightscope.com";
pub const DEFAULT_QUESTION: &str = "What is FlightScope Mevo+?";

/// The page to read and the question to ask about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub url: String,
    pub question: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            question: DEFAULT_QUESTION.to_string(),
        }
    }
}

/// Full application configuration, as loaded from `config.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub run: RunConfig,
    pub ollama: OllamaConfig,
    pub fetch: FetchConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub answer: AnswerConfig,
}

impl AppConfig {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            chunking: self.chunking.clone(),
            retrieval: self.retrieval.clone(),
            answer: self.answer.clone(),
            max_tokens: self.ollama.max_tokens,
        }
    }
}
