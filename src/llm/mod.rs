pub mod ollama;
pub mod provider;
pub mod types;


pub use ollama::{OllamaConfig, OllamaProvider};
pub use provider::{Embedder, LanguageModel};
pub use types::{ChatMessage, GenerateRequest};
