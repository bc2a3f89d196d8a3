use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    ports::{IndexStore, VectorIndex},
    DomainError, Embedding, Fingerprint, IndexEntry, RetrievalResult, SearchResult,
};

/// Exhaustive cosine index over entries held in memory. Norms are computed
/// once at build time.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    entries: Vec<IndexEntry>,
    norms: Vec<f32>,
    dimension: usize,
}

impl InMemoryVectorIndex {
    pub fn build(entries: Vec<IndexEntry>) -> Result<Self, DomainError> {
        let dimension = entries
            .first()
            .map(|e| e.embedding.dimension())
            .ok_or(DomainError::EmptyCorpus)?;

        for entry in &entries {
            entry.embedding.ensure_dimension(dimension)?;
        }

        let norms = entries.iter().map(|e| e.embedding.norm()).collect();
        Ok(Self {
            entries,
            norms,
            dimension,
        })
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    async fn query(&self, vector: &Embedding, k: usize) -> Result<RetrievalResult, DomainError> {
        vector.ensure_dimension(self.dimension)?;
        let query_norm = vector.norm();

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .zip(&self.norms)
            .enumerate()
            .map(|(i, (entry, &norm))| {
                (i, vector.cosine_with_norms(query_norm, &entry.embedding, norm))
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(RetrievalResult::new(
            scored
                .into_iter()
                .map(|(i, score)| SearchResult {
                    chunk: self.entries[i].chunk.clone(),
                    score,
                })
                .collect(),
        ))
    }
}

/// Builds in-memory indexes without persisting them.
#[derive(Debug, Default)]
pub struct MemoryIndexStore;

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn open(
        &self,
        _fingerprint: &Fingerprint,
    ) -> Result<Option<Arc<dyn VectorIndex>>, DomainError> {
        Ok(None)
    }

    async fn build(
        &self,
        _fingerprint: &Fingerprint,
        entries: Vec<IndexEntry>,
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        let index: Arc<dyn VectorIndex> = Arc::new(InMemoryVectorIndex::build(entries)?);
        Ok(index)
    }
}
