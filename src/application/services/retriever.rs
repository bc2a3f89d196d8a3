use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{
    ports::{EmbeddingService, VectorIndex},
    DomainError, RetrievalResult,
};

pub const DEFAULT_TOP_K: usize = 3;

/// Fixed retrieval policy: embed the query, take the index's top-k. No query
/// expansion, re-ranking or metadata filtering.
#[derive(Clone)]
pub struct Retriever {
    embedding: Arc<dyn EmbeddingService>,
    index: Arc<dyn VectorIndex>,
    default_top_k: usize,
}

impl Retriever {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        index: Arc<dyn VectorIndex>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            index,
            default_top_k,
        }
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    #[instrument(skip(self), fields(top_k = self.default_top_k))]
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResult, DomainError> {
        self.retrieve_top_k(query, self.default_top_k).await
    }

    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<RetrievalResult, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        let result = self.index.query(&embedding, top_k).await?;
        debug!(hits = result.len(), best = ?result.best_score(), "retrieved");
        Ok(result)
    }
}
