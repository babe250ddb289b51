pub mod core;
pub mod llm;
pub mod rag;
pub mod vector_math;

pub use crate::core::errors::{RagError, Result};
