use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{info, instrument};

use super::{DocumentService, Retriever};
use crate::domain::{
    ports::{EmbeddingService, IndexStore, VectorIndex},
    DomainError, Fingerprint, IndexEntry,
};

type IndexCell = Arc<OnceCell<Arc<dyn VectorIndex>>>;

/// Produces a ready [`Retriever`] for a document, building the index at most
/// once per fingerprint. Concurrent callers for the same fingerprint share a
/// single build; a persisted index is reopened instead of rebuilt.
pub struct IndexBuilder {
    documents: DocumentService,
    embedding: Arc<dyn EmbeddingService>,
    store: Arc<dyn IndexStore>,
    top_k: usize,
    cells: Mutex<HashMap<Fingerprint, IndexCell>>,
}

impl IndexBuilder {
    pub fn new(
        documents: DocumentService,
        embedding: Arc<dyn EmbeddingService>,
        store: Arc<dyn IndexStore>,
        top_k: usize,
    ) -> Self {
        Self {
            documents,
            embedding,
            store,
            top_k,
            cells: Mutex::new(HashMap::new()),
        }
    }

    pub fn fingerprint(&self, document: &[u8]) -> Fingerprint {
        Fingerprint::compute(document, self.documents.params(), &self.embedding.identity())
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn build_index(&self, path: &Path) -> Result<Retriever, DomainError> {
        let bytes = self.documents.read(path).await?;
        let fingerprint = self.fingerprint(&bytes);

        let cell = self.cell_for(&fingerprint)?;
        let index = cell
            .get_or_try_init(|| self.open_or_build(path, bytes, &fingerprint))
            .await?
            .clone();

        if index.dimension() != self.embedding.dimension() {
            return Err(DomainError::DimensionMismatch {
                expected: self.embedding.dimension(),
                actual: index.dimension(),
            });
        }

        Ok(Retriever::new(self.embedding.clone(), index, self.top_k))
    }

    fn cell_for(&self, fingerprint: &Fingerprint) -> Result<IndexCell, DomainError> {
        let mut cells = self
            .cells
            .lock()
            .map_err(|_| DomainError::index_store("index registry lock poisoned"))?;
        Ok(cells.entry(fingerprint.clone()).or_default().clone())
    }

    async fn open_or_build(
        &self,
        path: &Path,
        bytes: Vec<u8>,
        fingerprint: &Fingerprint,
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        if let Some(index) = self.store.open(fingerprint).await? {
            info!(fingerprint = %fingerprint.short(), entries = index.len(), "reusing persisted index");
            return Ok(index);
        }

        // Chunk the bytes that were fingerprinted, not a fresh read.
        let (doc, chunks) = self.documents.ingest_bytes(path, bytes).await?;
        if chunks.is_empty() {
            return Err(DomainError::EmptyCorpus);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(DomainError::embedding(format!(
                "requested {} embeddings, received {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry::new(chunk, embedding))
            .collect();

        let index = self.store.build(fingerprint, entries).await?;
        info!(
            fingerprint = %fingerprint.short(),
            source = doc.name(),
            entries = index.len(),
            "index built"
        );
        Ok(index)
    }
}
