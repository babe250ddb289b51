use std::fmt::Display;

use super::types::AppConfig;
use crate::core::errors::{RagError, Result};
use crate::rag::answerer::PromptTemplate;

pub fn validate_config(config: &AppConfig) -> Result<()> {
    validate_required_string_field("run.url", &config.run.url)?;
    validate_required_string_field("run.question", &config.run.question)?;

    let ollama = &config.ollama;
    validate_required_string_field("ollama.base_url", &ollama.base_url)?;
    validate_required_string_field("ollama.model", &ollama.model)?;
    validate_required_string_field("ollama.embedding_model", &ollama.embedding_model)?;
    validate_range_field("ollama.timeout_secs", ollama.timeout_secs, 1, 86_400)?;
    if let Some(max_tokens) = ollama.max_tokens {
        validate_range_field("ollama.max_tokens", max_tokens, 1, 1_000_000)?;
    }

    let fetch = &config.fetch;
    validate_range_field("fetch.timeout_secs", fetch.timeout_secs, 1, 86_400)?;
    validate_range_field("fetch.max_bytes", fetch.max_bytes, 1, 100_000_000)?;
    validate_required_string_field("fetch.user_agent", &fetch.user_agent)?;

    let chunking = &config.chunking;
    validate_range_field("chunking.chunk_size", chunking.chunk_size, 1, 1_000_000)?;
    validate_range_field(
        "chunking.chunk_overlap",
        chunking.chunk_overlap,
        0,
        chunking.chunk_size - 1,
    )?;
    validate_range_field(
        "chunking.boundary_lookback",
        chunking.boundary_lookback,
        0,
        1_000_000,
    )?;

    let retrieval = &config.retrieval;
    validate_range_field("retrieval.top_k", retrieval.top_k, 1, 10_000)?;
    validate_range_field(
        "retrieval.embed_batch_size",
        retrieval.embed_batch_size,
        1,
        10_000,
    )?;

    PromptTemplate::parse(&config.answer.template).map_err(|err| {
        RagError::InvalidConfig(format!("Invalid config at 'answer.template': {}", err))
    })?;

    Ok(())
}

fn validate_range_field<T>(path: &str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        return Err(RagError::InvalidConfig(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_required_string_field(path: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RagError::InvalidConfig(format!(
            "Invalid config at '{}': value cannot be empty",
            path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_invalid(config: &AppConfig, path: &str) {
        match validate_config(config) {
            Err(RagError::InvalidConfig(msg)) => {
                assert!(msg.contains(path), "'{}' does not mention {}", msg, path)
            }
            other => panic!("expected invalid config at {}, got {:?}", path, other),
        }
    }

    #[test]
    fn defaults_are_valid() {
        validate_config(&AppConfig::default()).expect("defaults");
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let mut config = AppConfig::default();
        config.chunking.chunk_size = 100;
        config.chunking.chunk_overlap = 100;
        expect_invalid(&config, "chunking.chunk_overlap");
    }

    #[test]
    fn zero_chunk_size_is_rejected_before_overlap_math() {
        let mut config = AppConfig::default();
        config.chunking.chunk_size = 0;
        config.chunking.chunk_overlap = 0;
        expect_invalid(&config, "chunking.chunk_size");
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        expect_invalid(&config, "retrieval.top_k");
    }

    #[test]
    fn blank_model_names_are_rejected() {
        let mut config = AppConfig::default();
        config.ollama.embedding_model = "  ".to_string();
        expect_invalid(&config, "ollama.embedding_model");
    }

    #[test]
    fn template_without_context_is_rejected() {
        let mut config = AppConfig::default();
        config.answer.template = "Question: {question}".to_string();
        expect_invalid(&config, "answer.template");
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let mut config = AppConfig::default();
        config.ollama.max_tokens = Some(0);
        expect_invalid(&config, "ollama.max_tokens");
    }
}
