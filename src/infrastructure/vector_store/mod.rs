mod disk;
mod in_memory;
mod qdrant;

use std::sync::Arc;

use crate::domain::{ports::IndexStore, DomainError};
use crate::infrastructure::config::{IndexBackend, IndexConfig};

pub use disk::DiskIndexStore;
pub use in_memory::{InMemoryVectorIndex, MemoryIndexStore};
pub use qdrant::{QdrantIndexStore, QdrantVectorIndex};

/// Index store selected by configuration. `dimension` is the embedding
/// provider's vector length.
pub fn index_store_for(
    config: &IndexConfig,
    dimension: usize,
) -> Result<Arc<dyn IndexStore>, DomainError> {
    let store: Arc<dyn IndexStore> = match config.backend {
        IndexBackend::Disk => Arc::new(DiskIndexStore::new(&config.cache_dir)),
        IndexBackend::Memory => Arc::new(MemoryIndexStore::new()),
        IndexBackend::Qdrant => Arc::new(QdrantIndexStore::new(
            &config.qdrant_url,
            &config.collection_prefix,
            dimension,
        )?),
    };
    Ok(store)
}
