use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Embedding, Fingerprint, IndexEntry, RetrievalResult};

/// A read-only nearest-neighbour index. Built once, never mutated.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    fn dimension(&self) -> usize;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `k` entries by descending cosine similarity, ties in insertion
    /// order. Fails with `DimensionMismatch` when `vector` has the wrong length.
    async fn query(&self, vector: &Embedding, k: usize) -> Result<RetrievalResult, DomainError>;
}

/// Where built indexes live, keyed by fingerprint.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Reopens the index persisted for `fingerprint`, if any.
    async fn open(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<Arc<dyn VectorIndex>>, DomainError>;

    /// Builds an index from `entries` and persists it under `fingerprint`.
    /// Fails with `EmptyCorpus` when `entries` is empty.
    async fn build(
        &self,
        fingerprint: &Fingerprint,
        entries: Vec<IndexEntry>,
    ) -> Result<Arc<dyn VectorIndex>, DomainError>;
}
