use std::path::Path;

use async_trait::async_trait;

use crate::domain::{errors::DomainError, SourceDocument};

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Raw bytes of the document at `path`, the input to the index fingerprint.
    async fn read(&self, path: &Path) -> Result<Vec<u8>, DomainError>;

    /// Splits bytes already returned by [`read`](Self::read) into pages in
    /// physical order, numbered from 1.
    async fn parse(&self, path: &Path, bytes: Vec<u8>) -> Result<SourceDocument, DomainError>;

    async fn load(&self, path: &Path) -> Result<SourceDocument, DomainError> {
        let bytes = self.read(path).await?;
        self.parse(path, bytes).await
    }
}
