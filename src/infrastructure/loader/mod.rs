mod pdf;
mod text;

use std::path::Path;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{ports::DocumentLoader, DomainError, SourceDocument};

pub use pdf::PdfLoader;
pub use text::TextLoader;

/// Separates a missing file from one that exists but cannot be read.
async fn read_source(path: &Path) -> Result<Vec<u8>, DomainError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DomainError::not_found(path)),
        Err(e) => Err(DomainError::unreadable(path, e.to_string())),
    }
}

fn source_id(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Dispatches to a loader by file extension.
#[derive(Debug, Default)]
pub struct MultiFormatLoader {
    pdf: PdfLoader,
    text: TextLoader,
}

impl MultiFormatLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn loader_for(&self, path: &Path) -> Result<&dyn DocumentLoader, DomainError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => Ok(&self.pdf as &dyn DocumentLoader),
            Some("txt" | "text" | "md" | "markdown") => Ok(&self.text as &dyn DocumentLoader),
            _ if !path.exists() => Err(DomainError::not_found(path)),
            _ => Err(DomainError::unreadable(path, "unsupported document format")),
        }
    }
}

#[async_trait]
impl DocumentLoader for MultiFormatLoader {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn read(&self, path: &Path) -> Result<Vec<u8>, DomainError> {
        self.loader_for(path)?.read(path).await
    }

    async fn parse(&self, path: &Path, bytes: Vec<u8>) -> Result<SourceDocument, DomainError> {
        self.loader_for(path)?.parse(path, bytes).await
    }
}
