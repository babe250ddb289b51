//! In-memory vector index with exact cosine search.
//!
//! Entries are kept in insertion order and scored by brute force, which is
//! plenty for the few hundred chunks a single page produces.

use crate::core::errors::{RagError, Result};
use crate::rag::types::{EmbeddedChunk, ScoredChunk};
use crate::vector_math::{cosine_similarity, is_degenerate};

#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<EmbeddedChunk>,
    dimension: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. The first entry fixes the index dimension.
    pub fn add(&mut self, item: EmbeddedChunk) -> Result<()> {
        if item.vector.is_empty() {
            return Err(RagError::DegenerateVector);
        }
        match self.dimension {
            Some(expected) if expected != item.dimension() => {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: item.dimension(),
                });
            }
            Some(_) => {}
            None => self.dimension = Some(item.dimension()),
        }
        if is_degenerate(&item.vector) {
            tracing::debug!(
                "Chunk {} has a zero-magnitude embedding and will never match",
                item.chunk.sequence_index
            );
        }
        self.entries.push(item);
        Ok(())
    }

    pub fn extend<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = EmbeddedChunk>,
    {
        for item in items {
            self.add(item)?;
        }
        Ok(())
    }

    /// Top-`k` entries by cosine similarity, best first.
    ///
    /// Ties keep insertion order. Entries with zero-magnitude vectors are
    /// skipped; a zero-magnitude query is an error.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Err(RagError::InvalidConfig(
                "k must be greater than zero".to_string(),
            ));
        }
        if is_degenerate(vector) {
            return Err(RagError::DegenerateVector);
        }
        if let Some(expected) = self.dimension {
            if expected != vector.len() {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = Vec::with_capacity(self.entries.len());
        for (idx, entry) in self.entries.iter().enumerate() {
            match cosine_similarity(vector, &entry.vector) {
                Ok(score) => scored.push((idx, score)),
                Err(RagError::DegenerateVector) => continue,
                Err(err) => return Err(err),
            }
        }

        // Stable sort: equal scores stay in insertion order.
        scored.sort_by(|left, right| right.1.total_cmp(&left.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| ScoredChunk {
                entry: self.entries[idx].clone(),
                score,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
