use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{read_source, source_id};
use crate::domain::{ports::DocumentLoader, DomainError, SourceDocument};

/// Extracts text page by page with `pdf-extract`. Parsing runs on the
/// blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, DomainError> {
        read_source(path).await
    }

    #[instrument(skip(self, bytes), fields(path = %path.display(), bytes = bytes.len()))]
    async fn parse(&self, path: &Path, bytes: Vec<u8>) -> Result<SourceDocument, DomainError> {
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .await
        .map_err(|e| DomainError::unreadable(path, format!("pdf parser aborted: {e}")))?
        .map_err(|e| DomainError::unreadable(path, e.to_string()))?;

        if pages.is_empty() {
            return Err(DomainError::unreadable(path, "pdf has no pages"));
        }
        debug!(pages = pages.len(), "extracted pdf text");

        Ok(SourceDocument::from_page_texts(source_id(path), pages))
    }
}
