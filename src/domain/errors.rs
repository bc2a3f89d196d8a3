use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("Document unreadable: {}: {reason}", .path.display())]
    DocumentUnreadable { path: PathBuf, reason: String },

    #[error("Document produced no indexable text")]
    EmptyCorpus,

    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Dimension mismatch: index holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid chunking parameters: {0}")]
    InvalidChunking(String),

    #[error("Index store error: {0}")]
    IndexStore(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::DocumentNotFound(path.as_ref().to_path_buf())
    }

    pub fn unreadable(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::DocumentUnreadable {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::EmbeddingProvider(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn index_store(msg: impl Into<String>) -> Self {
        Self::IndexStore(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Transient provider or store failures; retrying the same question may
    /// succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingProvider(_) | Self::Generation(_) | Self::IndexStore(_)
        )
    }

    /// Embedding provider and index disagree. No later question can succeed,
    /// so a conversation must stop rather than keep recording errors.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DimensionMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
