use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("degenerate vector: magnitude is zero")]
    DegenerateVector,
    #[error("embedding service unavailable: {0}")]
    EmbedderUnavailable(String),
    #[error("language model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("language model timed out after {0:?}")]
    ModelTimeout(Duration),
}

impl RagError {
    pub fn invalid_config<E: std::fmt::Display>(err: E) -> Self {
        RagError::InvalidConfig(err.to_string())
    }

    pub fn fetch<E: std::fmt::Display>(url: &str, err: E) -> Self {
        RagError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn embedder<E: std::fmt::Display>(err: E) -> Self {
        RagError::EmbedderUnavailable(err.to_string())
    }

    pub fn model<E: std::fmt::Display>(err: E) -> Self {
        RagError::ModelUnavailable(err.to_string())
    }

    /// Pipeline stage the error originates from.
    pub fn stage(&self) -> &'static str {
        match self {
            RagError::InvalidConfig(_) => "config",
            RagError::Fetch { .. } => "fetch",
            RagError::DimensionMismatch { .. } | RagError::DegenerateVector => "index",
            RagError::EmbedderUnavailable(_) => "embed",
            RagError::ModelUnavailable(_) | RagError::ModelTimeout(_) => "answer",
        }
    }
}

pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_follow_error_kind() {
        assert_eq!(RagError::invalid_config("k").stage(), "config");
        assert_eq!(RagError::fetch("http://x", "boom").stage(), "fetch");
        assert_eq!(RagError::DegenerateVector.stage(), "index");
        assert_eq!(
            RagError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
            .stage(),
            "index"
        );
        assert_eq!(RagError::embedder("down").stage(), "embed");
        assert_eq!(
            RagError::ModelTimeout(Duration::from_secs(1)).stage(),
            "answer"
        );
    }

    #[test]
    fn fetch_error_names_the_url() {
        let err = RagError::fetch("https://example.com", "404 Not Found");
        assert_eq!(
            err.to_string(),
            "failed to fetch https://example.com: 404 Not Found"
        );
    }
}
