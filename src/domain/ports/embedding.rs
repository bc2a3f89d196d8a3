use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Every vector an implementation returns has exactly `dimension()` entries.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    /// Order-preserving: the i-th vector belongs to the i-th text.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
    fn model_id(&self) -> &str;

    /// Stable identity used in index fingerprints.
    fn identity(&self) -> String {
        format!("{}:{}", self.model_id(), self.dimension())
    }
}
