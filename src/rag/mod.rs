//! Retrieval-augmented answering over a single web page.
//!
//! - `Chunker`: splits page text into overlapping windows
//! - `VectorIndex`: exact cosine search over embedded chunks
//! - `Retriever` / `Answerer`: top-k lookup and prompt-driven generation
//! - `Pipeline`: wires the stages together for one run

pub mod answerer;
pub mod chunker;
pub mod fetcher;
pub mod html;
pub mod index;
pub mod pipeline;
pub mod retriever;
pub mod types;

pub use answerer::{AnswerConfig, Answerer, PromptTemplate, DEFAULT_TEMPLATE};
pub use chunker::{merge_chunks, Chunker, ChunkingConfig};
pub use fetcher::{FetchConfig, Fetcher, HttpFetcher};
pub use index::VectorIndex;
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
pub use retriever::{RetrievalConfig, Retriever};
pub use types::{Answer, Chunk, Document, EmbeddedChunk, Query, RetrievalResult, ScoredChunk};
