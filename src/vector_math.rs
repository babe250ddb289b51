use crate::core::errors::{RagError, Result};

pub fn dot(left: &[f32], right: &[f32]) -> f32 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}

pub fn l2_norm(vector: &[f32]) -> f32 {
    dot(vector, vector).sqrt()
}

pub fn is_degenerate(vector: &[f32]) -> bool {
    l2_norm(vector) == 0.0
}

/// `dot(a, b) / (|a| * |b|)`, clamped to [-1, 1].
pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Result<f32> {
    if query.len() != candidate.len() {
        return Err(RagError::DimensionMismatch {
            expected: query.len(),
            actual: candidate.len(),
        });
    }

    let query_norm = l2_norm(query);
    let candidate_norm = l2_norm(candidate);
    if query_norm == 0.0 || candidate_norm == 0.0 {
        return Err(RagError::DegenerateVector);
    }

    Ok((dot(query, candidate) / (query_norm * candidate_norm)).clamp(-1.0, 1.0))
}
