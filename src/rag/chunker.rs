//! Overlapping, boundary-aware text chunking.
//!
//! Sizes are measured in characters (Unicode scalar values). Consecutive
//! chunks share exactly `chunk_overlap` characters and chunk text is never
//! trimmed, so the original text can always be rebuilt from the chunks.

use serde::{Deserialize, Serialize};

use crate::core::errors::{RagError, Result};
use crate::rag::types::Chunk;

/// Configuration for the chunker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
    /// How far back from the hard cut to look for a natural boundary
    pub boundary_lookback: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            boundary_lookback: 200,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Boundary kinds, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Line,
    Sentence,
    Word,
}

const BOUNDARY_PRIORITY: [Boundary; 4] = [
    Boundary::Paragraph,
    Boundary::Line,
    Boundary::Sentence,
    Boundary::Word,
];

impl Boundary {
    /// Whether cutting before `chars[pos]` lands on this kind of boundary.
    fn matches(self, chars: &[char], pos: usize) -> bool {
        if pos == 0 || pos >= chars.len() {
            return false;
        }
        let prev = chars[pos - 1];
        match self {
            Boundary::Paragraph => pos >= 2 && prev == '\n' && chars[pos - 2] == '\n',
            Boundary::Line => prev == '\n',
            Boundary::Sentence => matches!(prev, '.' | '!' | '?') && chars[pos].is_whitespace(),
            Boundary::Word => prev.is_whitespace(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Fails with `InvalidConfig` if `chunk_size == 0` or `chunk_overlap >= chunk_size`.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split text into overlapping chunks.
    pub fn split(&self, text: &str, source_url: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();
        let overlap = self.config.chunk_overlap;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total_chars {
            let hard_end = (start + self.config.chunk_size).min(total_chars);
            let end = if hard_end < total_chars {
                self.find_boundary(&chars, start, hard_end)
                    .unwrap_or(hard_end)
            } else {
                hard_end
            };

            chunks.push(Chunk {
                text: chars[start..end].iter().collect(),
                sequence_index: chunks.len(),
                source_url: source_url.to_string(),
                start_offset: start,
            });

            if end == total_chars {
                break;
            }
            // end > start + overlap, so the window always moves forward.
            start = end - overlap;
        }

        chunks
    }

    /// Latest natural boundary in the look-back window that still moves the
    /// next window past the current start.
    fn find_boundary(&self, chars: &[char], start: usize, hard_end: usize) -> Option<usize> {
        let earliest = hard_end
            .saturating_sub(self.config.boundary_lookback)
            .max(start + self.config.chunk_overlap + 1);
        if earliest > hard_end {
            return None;
        }

        BOUNDARY_PRIORITY.iter().find_map(|kind| {
            (earliest..=hard_end)
                .rev()
                .find(|&pos| kind.matches(chars, pos))
        })
    }
}

/// Rebuild the source text from chunks produced with `overlap`.
pub fn merge_chunks(chunks: &[Chunk], overlap: usize) -> String {
    let mut merged = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            merged.push_str(&chunk.text);
        } else {
            merged.extend(chunk.text.chars().skip(overlap));
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_size: usize, chunk_overlap: usize, boundary_lookback: usize) -> Chunker {
        Chunker::new(ChunkingConfig {
            chunk_size,
            chunk_overlap,
            boundary_lookback,
        })
        .expect("valid config")
    }

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = Chunker::new(ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
            boundary_lookback: 0,
        })
        .unwrap_err();
        assert!(matches!(err, RagError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        let err = Chunker::new(ChunkingConfig {
            chunk_size: 4,
            chunk_overlap: 4,
            boundary_lookback: 0,
        })
        .unwrap_err();
        assert!(matches!(err, RagError::InvalidConfig(_)));
    }

    #[test]
    fn sliding_window_without_lookback() {
        let chunks = chunker(4, 2, 0).split("A. B. C.", "https://example.com");
        assert_eq!(texts(&chunks), vec!["A. B", " B. ", ". C."]);
        assert_eq!(
            chunks.iter().map(|c| c.start_offset).collect::<Vec<_>>(),
            vec![0, 2, 4]
        );
        assert_eq!(
            chunks.iter().map(|c| c.sequence_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(chunks.iter().all(|c| c.source_url == "https://example.com"));
    }

    #[test]
    fn hard_cut_advances_by_size_minus_overlap() {
        let chunks = chunker(10, 3, 0).split(&"x".repeat(30), "doc");
        let offsets: Vec<usize> = chunks.iter().map(|c| c.start_offset).collect();
        assert_eq!(offsets, vec![0, 7, 14, 21]);
        assert_eq!(chunks.last().map(|c| c.text.len()), Some(9));
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunker(10, 2, 5).split("", "doc").is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunker(100, 20, 20).split("Short text.", "doc");
        assert_eq!(texts(&chunks), vec!["Short text."]);
    }

    #[test]
    fn prefers_paragraph_break() {
        let text = "First paragraph.\n\nSecond one here and more words";
        let chunks = chunker(24, 2, 12).split(text, "doc");
        assert_eq!(chunks[0].text, "First paragraph.\n\n");
    }

    #[test]
    fn prefers_sentence_end_over_word_break() {
        let text = "One two. Three four five six";
        let chunks = chunker(16, 1, 10).split(text, "doc");
        assert_eq!(chunks[0].text, "One two.");
    }

    #[test]
    fn falls_back_to_word_break() {
        let text = "alpha beta gamma delta";
        let chunks = chunker(13, 2, 6).split(text, "doc");
        assert_eq!(chunks[0].text, "alpha beta ");
    }

    #[test]
    fn multibyte_text_is_split_on_characters() {
        let text = "日本語のテキストです。";
        let chunks = chunker(4, 1, 0).split(text, "doc");
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 4));
        assert_eq!(merge_chunks(&chunks, 1), text);
    }

    #[test]
    fn chunks_round_trip_to_original_text() {
        let text = "This is a test. Another sentence follows!\n\nA new paragraph? Yes.\nLine two of it. "
            .repeat(7);
        for (size, overlap, lookback) in [(1, 0, 0), (7, 3, 5), (50, 10, 20), (64, 63, 64), (200, 0, 100)] {
            let chunks = chunker(size, overlap, lookback).split(&text, "doc");
            assert_eq!(
                merge_chunks(&chunks, overlap),
                text,
                "size={size} overlap={overlap} lookback={lookback}"
            );
            assert!(chunks.iter().all(|c| c.text.chars().count() <= size));
        }
    }

    #[test]
    fn consecutive_chunks_share_exact_overlap() {
        let text = "The quick brown fox. Jumps over the lazy dog! ".repeat(5);
        let chunks = chunker(30, 8, 12).split(&text, "doc");
        for pair in chunks.windows(2) {
            let tail: String = {
                let chars: Vec<char> = pair[0].text.chars().collect();
                chars[chars.len() - 8..].iter().collect()
            };
            let head: String = pair[1].text.chars().take(8).collect();
            assert_eq!(tail, head);
        }
    }
}
