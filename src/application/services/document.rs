use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{
    ports::DocumentLoader, split_pages, Chunk, ChunkingParams, DomainError, SourceDocument,
};

/// Ingestion: load a document and split it into chunks.
pub struct DocumentService {
    loader: Arc<dyn DocumentLoader>,
    params: ChunkingParams,
}

impl DocumentService {
    pub fn new(loader: Arc<dyn DocumentLoader>, params: ChunkingParams) -> Self {
        Self { loader, params }
    }

    pub fn params(&self) -> ChunkingParams {
        self.params
    }

    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, DomainError> {
        self.loader.read(path).await
    }

    pub async fn ingest(&self, path: &Path) -> Result<(SourceDocument, Vec<Chunk>), DomainError> {
        let bytes = self.read(path).await?;
        self.ingest_bytes(path, bytes).await
    }

    /// Chunks bytes previously returned by [`read`](Self::read) for `path`.
    #[instrument(skip(self, path, bytes), fields(path = %path.display(), bytes = bytes.len()))]
    pub async fn ingest_bytes(
        &self,
        path: &Path,
        bytes: Vec<u8>,
    ) -> Result<(SourceDocument, Vec<Chunk>), DomainError> {
        let doc = self.loader.parse(path, bytes).await?;
        let chunks = split_pages(&doc.id, doc.pages(), self.params)?;

        info!(
            pages = doc.page_count(),
            chunks = chunks.len(),
            max_size = self.params.max_size,
            overlap = self.params.overlap,
            "document chunked"
        );
        Ok((doc, chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::TextLoader;

    #[tokio::test]
    async fn test_ingest_chunks_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        let text = format!("{}\u{c}{}", "a".repeat(1500), "b".repeat(500));
        std::fs::write(&path, text).unwrap();

        let service = DocumentService::new(
            Arc::new(TextLoader),
            ChunkingParams::new(1000, 200).unwrap(),
        );
        let (doc, chunks) = service.ingest(&path).await.unwrap();

        assert_eq!(doc.page_count(), 2);
        assert_eq!(chunks.len(), 3);
        let starts: Vec<(usize, usize)> = chunks
            .iter()
            .map(|c| (c.page_number, c.span.start))
            .collect();
        assert_eq!(starts, vec![(1, 0), (1, 800), (2, 0)]);
        assert!(chunks.iter().all(|c| c.source_id == doc.id));
    }

    #[tokio::test]
    async fn test_missing_document_propagates() {
        let service = DocumentService::new(Arc::new(TextLoader), ChunkingParams::default());
        let err = service
            .ingest(Path::new("/nonexistent/book.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DocumentNotFound(_)));
    }
}
