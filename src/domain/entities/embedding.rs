use serde::{Deserialize, Serialize};

use super::chunk::Chunk;
use crate::domain::errors::{DomainError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(vec: Vec<f32>) -> Self {
        Self(vec)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn norm(&self) -> f32 {
        self.0.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    pub fn ensure_dimension(&self, expected: usize) -> Result<()> {
        if self.dimension() == expected {
            Ok(())
        } else {
            Err(DomainError::DimensionMismatch {
                expected,
                actual: self.dimension(),
            })
        }
    }

    /// Cosine similarity given both norms up front. Zero-magnitude vectors
    /// score 0.0.
    pub fn cosine_with_norms(&self, self_norm: f32, other: &Embedding, other_norm: f32) -> f32 {
        if self_norm == 0.0 || other_norm == 0.0 {
            return 0.0;
        }
        let dot: f32 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
        dot / (self_norm * other_norm)
    }

    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.dimension() != other.dimension() {
            return 0.0;
        }
        self.cosine_with_norms(self.norm(), other, other.norm())
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vec: Vec<f32>) -> Self {
        Self(vec)
    }
}

impl AsRef<[f32]> for Embedding {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// A chunk paired with its vector, the unit a vector index is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Embedding,
}

impl IndexEntry {
    pub fn new(chunk: Chunk, embedding: Embedding) -> Self {
        Self { chunk, embedding }
    }
}
