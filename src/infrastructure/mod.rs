pub mod config;
pub mod embedding;
pub mod llm;
pub mod loader;
pub mod vector_store;

pub use config::{
    ApiCredential, AppConfig, EmbeddingConfig, IndexBackend, IndexConfig, LlmConfig,
    RetrievalConfig,
};
pub use embedding::GeminiEmbedding;
pub use llm::{gemini_client, GeminiLlm};
pub use loader::{MultiFormatLoader, PdfLoader, TextLoader};
pub use vector_store::{
    index_store_for, DiskIndexStore, InMemoryVectorIndex, MemoryIndexStore, QdrantIndexStore,
};
