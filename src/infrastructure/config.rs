use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::domain::{ChunkingParams, DomainError, PromptTemplate, ReplyFormat};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub document: DocumentConfig,
    pub chunking: ChunkingParams,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub index: IndexConfig,
    pub prompts: PromptTemplate,
    pub messages: ReplyFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Best-hit cosine score below which the model is not consulted and the
    /// fallback sentence is returned directly. Off when unset.
    pub min_score: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    Disk,
    Qdrant,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub backend: IndexBackend,
    pub cache_dir: PathBuf,
    pub qdrant_url: String,
    pub collection_prefix: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Temel Müzik Eğitimi.pdf"),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-004".to_string(),
            dimension: 768,
            batch_size: 100,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.2,
            timeout_seconds: 120,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_score: None,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Disk,
            cache_dir: PathBuf::from("./index_cache"),
            qdrant_url: "http://localhost:6334".to_string(),
            collection_prefix: "music_theory".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads YAML from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::config(format!("reading {}: {e}", path.display())))?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, DomainError> {
        let config: Self =
            serde_yaml::from_str(raw).map_err(|e| DomainError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.chunking.validate()?;

        if self.embedding.dimension == 0 {
            return Err(DomainError::config("embedding.dimension must be positive"));
        }
        if self.embedding.batch_size == 0 {
            return Err(DomainError::config("embedding.batch_size must be positive"));
        }
        if self.retrieval.top_k == 0 {
            return Err(DomainError::config("retrieval.top_k must be positive"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DomainError::config(format!(
                "llm.temperature {} outside [0, 2]",
                self.llm.temperature
            )));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(DomainError::config("llm.timeout_seconds must be positive"));
        }
        self.prompts.validate()
    }
}

/// Opaque API credential. Never printed; only provider adapters read it.
#[derive(Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// First non-empty value among the given environment variables.
    pub fn from_env(vars: &[&str]) -> Result<Self, DomainError> {
        vars.iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .map(Self)
            .ok_or_else(|| {
                DomainError::config(format!("no credential found in {}", vars.join(" or ")))
            })
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.chunking, ChunkingParams::new(1000, 200).unwrap());
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.index.backend, IndexBackend::Disk);
        assert!((config.llm.temperature - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = AppConfig::from_yaml(
            "chunking:\n  max_size: 500\n  overlap: 50\nindex:\n  backend: memory\n",
        )
        .unwrap();
        assert_eq!(config.chunking.max_size, 500);
        assert_eq!(config.index.backend, IndexBackend::Memory);
        assert_eq!(config.embedding.model, "text-embedding-004");
        assert_eq!(config.retrieval.min_score, None);
    }

    #[test]
    fn test_rejects_overlap_not_below_max_size() {
        let err = AppConfig::from_yaml("chunking:\n  max_size: 100\n  overlap: 100\n").unwrap_err();
        assert!(matches!(err, DomainError::InvalidChunking(_)));
    }

    #[test]
    fn test_rejects_template_without_question() {
        let err = AppConfig::from_yaml("prompts:\n  template: \"{context} {fallback}\"\n").unwrap_err();
        assert!(err.to_string().contains("{question}"));
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config = AppConfig::from_yaml(include_str!("../../config.example.yaml")).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.chunking, defaults.chunking);
        assert_eq!(config.document.path, defaults.document.path);
        assert_eq!(config.messages.sources_heading, defaults.messages.sources_heading);
        assert_eq!(config.index.collection_prefix, defaults.index.collection_prefix);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = ApiCredential::new("secret-key");
        assert_eq!(format!("{credential:?}"), "ApiCredential(***)");
        assert_eq!(credential.expose(), "secret-key");
    }
}
