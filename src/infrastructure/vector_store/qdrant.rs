use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, GetPointsBuilder,
    PointId, PointStruct, SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    ports::{IndexStore, VectorIndex},
    CharSpan, Chunk, DomainError, Embedding, Fingerprint, IndexEntry, RetrievalResult,
    SearchResult,
};

const UPSERT_BATCH: usize = 256;

const KIND_CHUNK: &str = "chunk";
const KIND_MANIFEST: &str = "manifest";

fn external(e: impl std::fmt::Display) -> DomainError {
    DomainError::index_store(format!("qdrant: {e}"))
}

/// Keeps one Qdrant collection per fingerprint, named
/// `<prefix>_<first 16 hex chars of the fingerprint>`.
///
/// A build writes a manifest point holding the entry count only after every
/// chunk upsert has been acknowledged. A collection is reused only when its
/// manifest exists and matches the number of chunk points, so an interrupted
/// build is rebuilt rather than served.
pub struct QdrantIndexStore {
    client: Arc<Qdrant>,
    collection_prefix: String,
    dimension: usize,
}

impl QdrantIndexStore {
    pub fn new(url: &str, collection_prefix: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url).build().map_err(external)?;
        Ok(Self {
            client: Arc::new(client),
            collection_prefix: collection_prefix.to_string(),
            dimension,
        })
    }

    fn collection_name(&self, fingerprint: &Fingerprint) -> String {
        format!("{}_{}", self.collection_prefix, fingerprint.short())
    }

    async fn chunk_count(&self, collection: &str) -> Result<u64, DomainError> {
        let response = self
            .client
            .count(
                CountPointsBuilder::new(collection)
                    .filter(chunk_filter())
                    .exact(true),
            )
            .await
            .map_err(external)?;
        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn manifest(&self, collection: &str) -> Result<Option<usize>, DomainError> {
        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(collection, vec![manifest_id()]).with_payload(true),
            )
            .await
            .map_err(external)?;
        Ok(response
            .result
            .iter()
            .find_map(|point| manifest_entries(&point.payload)))
    }
}

#[async_trait]
impl IndexStore for QdrantIndexStore {
    #[instrument(skip(self), fields(fingerprint = %fingerprint.short()))]
    async fn open(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<Arc<dyn VectorIndex>>, DomainError> {
        let collection = self.collection_name(fingerprint);
        if !self
            .client
            .collection_exists(collection.as_str())
            .await
            .map_err(external)?
        {
            return Ok(None);
        }

        let expected = self.manifest(&collection).await?;
        let count = self.chunk_count(&collection).await?;
        let Some(len) = complete_len(expected, count) else {
            warn!(collection = %collection, ?expected, count, "incomplete qdrant collection, rebuilding");
            return Ok(None);
        };

        info!(collection = %collection, len, "reusing qdrant collection");
        let index: Arc<dyn VectorIndex> = Arc::new(QdrantVectorIndex {
            client: self.client.clone(),
            collection,
            dimension: self.dimension,
            len,
        });
        Ok(Some(index))
    }

    #[instrument(skip(self, entries), fields(fingerprint = %fingerprint.short(), count = entries.len()))]
    async fn build(
        &self,
        fingerprint: &Fingerprint,
        entries: Vec<IndexEntry>,
    ) -> Result<Arc<dyn VectorIndex>, DomainError> {
        if entries.is_empty() {
            return Err(DomainError::EmptyCorpus);
        }
        for entry in &entries {
            entry.embedding.ensure_dimension(self.dimension)?;
        }

        let collection = self.collection_name(fingerprint);
        if self
            .client
            .collection_exists(collection.as_str())
            .await
            .map_err(external)?
        {
            self.client
                .delete_collection(collection.as_str())
                .await
                .map_err(external)?;
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&collection).vectors_config(VectorParamsBuilder::new(
                    self.dimension as u64,
                    Distance::Cosine,
                )),
            )
            .await
            .map_err(external)?;

        let len = entries.len();
        let points = entries
            .iter()
            .enumerate()
            .map(|(ordinal, entry)| to_point(ordinal, entry))
            .collect::<Result<Vec<_>, _>>()?;

        for batch in points.chunks(UPSERT_BATCH) {
            self.client
                .upsert_points(UpsertPointsBuilder::new(&collection, batch.to_vec()).wait(true))
                .await
                .map_err(external)?;
        }

        self.client
            .upsert_points(
                UpsertPointsBuilder::new(&collection, vec![manifest_point(len, self.dimension)?])
                    .wait(true),
            )
            .await
            .map_err(external)?;

        info!(collection = %collection, len, "built qdrant collection");
        let index: Arc<dyn VectorIndex> = Arc::new(QdrantVectorIndex {
            client: self.client.clone(),
            collection,
            dimension: self.dimension,
            len,
        });
        Ok(index)
    }
}

pub struct QdrantVectorIndex {
    client: Arc<Qdrant>,
    collection: String,
    dimension: usize,
    len: usize,
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.len
    }

    async fn query(&self, vector: &Embedding, k: usize) -> Result<RetrievalResult, DomainError> {
        vector.ensure_dimension(self.dimension)?;
        if k == 0 {
            return Ok(RetrievalResult::default());
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.as_slice().to_vec(), k as u64)
                    .filter(chunk_filter())
                    .with_payload(true),
            )
            .await
            .map_err(external)?;

        let mut hits: Vec<(usize, SearchResult)> = response
            .result
            .into_iter()
            .filter_map(|point| {
                let (ordinal, chunk) = from_payload(&point.payload)?;
                Some((
                    ordinal,
                    SearchResult {
                        chunk,
                        score: point.score,
                    },
                ))
            })
            .collect();

        // Qdrant does not promise an order among equal scores; restore insertion order.
        hits.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then(a.0.cmp(&b.0)));

        Ok(RetrievalResult::new(hits.into_iter().map(|(_, hit)| hit).collect()))
    }
}

fn chunk_filter() -> Filter {
    Filter::must([Condition::matches("kind", KIND_CHUNK.to_string())])
}

fn manifest_id() -> PointId {
    PointId::from(Uuid::nil().to_string())
}

/// The manifest needs a vector to be stored; cosine rejects the zero vector.
fn manifest_point(entries: usize, dimension: usize) -> Result<PointStruct, DomainError> {
    let payload: Payload = serde_json::json!({
        "kind": KIND_MANIFEST,
        "entries": entries,
    })
    .try_into()
    .map_err(|_| DomainError::index_store("failed to build qdrant manifest"))?;

    let mut vector = vec![0.0f32; dimension];
    if let Some(first) = vector.first_mut() {
        *first = 1.0;
    }
    Ok(PointStruct::new(Uuid::nil().to_string(), vector, payload))
}

fn manifest_entries(payload: &HashMap<String, Value>) -> Option<usize> {
    if payload.get("kind")?.as_str()? != KIND_MANIFEST {
        return None;
    }
    payload.get("entries")?.as_integer().map(|v| v as usize)
}

/// Entry count of a finished build, or `None` when the manifest is missing or
/// disagrees with the chunk points actually stored.
fn complete_len(expected: Option<usize>, chunk_points: u64) -> Option<usize> {
    expected.filter(|&n| n > 0 && n as u64 == chunk_points)
}

fn to_point(ordinal: usize, entry: &IndexEntry) -> Result<PointStruct, DomainError> {
    let chunk = &entry.chunk;
    let payload: Payload = serde_json::json!({
        "kind": KIND_CHUNK,
        "chunk_id": chunk.id.to_string(),
        "source_id": chunk.source_id,
        "page_number": chunk.page_number,
        "text": chunk.text,
        "span_start": chunk.span.start,
        "span_end": chunk.span.end,
        "ordinal": ordinal,
    })
    .try_into()
    .map_err(|_| DomainError::index_store("failed to build qdrant payload"))?;

    Ok(PointStruct::new(
        chunk.id.to_string(),
        entry.embedding.as_slice().to_vec(),
        payload,
    ))
}

fn from_payload(payload: &HashMap<String, Value>) -> Option<(usize, Chunk)> {
    if payload.get("kind")?.as_str()? != KIND_CHUNK {
        return None;
    }
    let int = |key: &str| payload.get(key)?.as_integer().map(|v| v as usize);
    let chunk = Chunk {
        id: payload.get("chunk_id")?.as_str()?.parse::<Uuid>().ok()?,
        source_id: payload.get("source_id")?.as_str()?.to_string(),
        page_number: int("page_number")?,
        text: payload.get("text")?.as_str()?.to_string(),
        span: CharSpan {
            start: int("span_start")?,
            end: int("span_end")?,
        },
    };
    Some((int("ordinal")?, chunk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{split_pages, ChunkingParams, Page};

    #[test]
    fn test_payload_round_trips_chunk_fields() {
        let pages = vec![Page::new(7, "Sus işaretleri.")];
        let chunk = split_pages("docs/book.pdf", &pages, ChunkingParams::default())
            .unwrap()
            .remove(0);
        let entry = IndexEntry::new(chunk.clone(), Embedding::new(vec![0.5, 0.5]));

        let point = to_point(3, &entry).unwrap();
        let (ordinal, restored) = from_payload(&point.payload).unwrap();

        assert_eq!(ordinal, 3);
        assert_eq!(restored, chunk);
    }

    #[test]
    fn test_manifest_records_entry_count() {
        let point = manifest_point(42, 4).unwrap();
        assert_eq!(manifest_entries(&point.payload), Some(42));
        assert!(from_payload(&point.payload).is_none());
    }

    #[test]
    fn test_chunk_point_is_not_a_manifest() {
        let pages = vec![Page::new(1, "Porte")];
        let chunk = split_pages("book.pdf", &pages, ChunkingParams::default())
            .unwrap()
            .remove(0);
        let point = to_point(0, &IndexEntry::new(chunk, Embedding::new(vec![1.0]))).unwrap();
        assert_eq!(manifest_entries(&point.payload), None);
    }

    #[test]
    fn test_partial_build_is_not_reused() {
        assert_eq!(complete_len(Some(120), 120), Some(120));
        // interrupted before the manifest was written
        assert_eq!(complete_len(None, 80), None);
        // manifest present but chunk points lost or duplicated
        assert_eq!(complete_len(Some(120), 80), None);
        assert_eq!(complete_len(Some(120), 121), None);
        assert_eq!(complete_len(Some(0), 0), None);
    }

    #[test]
    fn test_payload_missing_field_is_skipped() {
        let mut payload = HashMap::new();
        payload.insert("kind".to_string(), Value::from(KIND_CHUNK.to_string()));
        payload.insert("chunk_id".to_string(), Value::from(Uuid::new_v4().to_string()));
        assert!(from_payload(&payload).is_none());
    }
}
