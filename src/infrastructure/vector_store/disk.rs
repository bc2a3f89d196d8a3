use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::in_memory::InMemoryVectorIndex;
use crate::domain::{
    ports::{IndexStore, VectorIndex},
    DomainError, Fingerprint, IndexEntry,
};

const SNAPSHOT_FILE: &str = "index.json";

#[derive(Serialize)]
struct SnapshotRef<'a> {
    fingerprint: &'a Fingerprint,
    dimension: usize,
    built_at: DateTime<Utc>,
    entries: &'a [IndexEntry],
}

#[derive(Deserialize)]
struct Snapshot {
    fingerprint: Fingerprint,
    dimension: usize,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

/// Persists each built index as a JSON snapshot in `<root>/<fingerprint>/`.
/// Reopening loads the snapshot back into an [`InMemoryVectorIndex`].
#[derive(Debug, Clone)]
pub struct DiskIndexStore {
    root: PathBuf,
}

impl DiskIndexStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root.join(fingerprint.as_str()).join(SNAPSHOT_FILE)
    }
}

#[async_trait]
impl IndexStore for DiskIndexStore {
    #[instrument(skip(self), fields(fingerprint = %fingerprint.short()))]
    async fn open(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<Arc<dyn VectorIndex>>, DomainError> {
        let path = self.snapshot_path(fingerprint);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot");
                return Ok(None);
            }
            Err(e) => {
                return Err(DomainError::index_store(format!(
                    "reading {}: {e}",
                    path.display()
                )))
            }
        };

        let snapshot: Snapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable snapshot, rebuilding");
                return Ok(None);
            }
        };

        if &snapshot.fingerprint != fingerprint {
            warn!(path = %path.display(), "snapshot fingerprint mismatch, rebuilding");
            return Ok(None);
        }

        let index = match InMemoryVectorIndex::build(snapshot.entries) {
            Ok(index) if index.dimension() == snapshot.dimension => index,
            Ok(_) | Err(_) => {
                warn!(path = %path.display(), "inconsistent snapshot, rebuilding");
                return Ok(None);
            }
        };

        info!(
            entries = index.len(),
            built_at = %snapshot.built_at,
            "reopened persisted index"
        );
        let index: Arc<dyn VectorIndex> = Arc::new(index);
        Ok(Some(index))
    }

    #[instrument(skip(self, entries), fields(fingerprint = %fingerprint.short(), count = entries.len()))]
    async fn build(
        &self,
        fingerprint: &Fingerprint,
        entries: Vec<IndexEntry>,
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        let index = InMemoryVectorIndex::build(entries)?;

        let path = self.snapshot_path(fingerprint);
        let dir = path
            .parent()
            .ok_or_else(|| DomainError::index_store("snapshot path has no parent"))?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::index_store(format!("creating {}: {e}", dir.display())))?;

        let json = serde_json::to_vec(&SnapshotRef {
            fingerprint,
            dimension: index.dimension(),
            built_at: Utc::now(),
            entries: index.entries(),
        })
        .map_err(|e| DomainError::index_store(e.to_string()))?;

        // Write then rename so a crash never leaves a truncated snapshot behind.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| DomainError::index_store(format!("writing {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| DomainError::index_store(format!("renaming {}: {e}", tmp.display())))?;

        info!(path = %path.display(), bytes = json.len(), "persisted index");
        let index: Arc<dyn VectorIndex> = Arc::new(index);
        Ok(index)
    }
}
