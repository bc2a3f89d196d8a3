use async_trait::async_trait;
use rig::client::EmbeddingsClient;
use rig::embeddings::EmbeddingModel;
use rig::providers::gemini;
use tracing::{debug, instrument};

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

pub struct GeminiEmbedding {
    client: gemini::Client,
    model: String,
    dimension: usize,
    batch_size: usize,
}

impl GeminiEmbedding {
    pub fn new(client: gemini::Client, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
        }
    }

    fn convert(&self, raw: Vec<f64>) -> Result<Embedding, DomainError> {
        to_embedding(&self.model, self.dimension, raw)
    }
}

/// A provider vector of the wrong length is a provider failure, not an index
/// mismatch: the configured dimension is what the index was built with.
fn to_embedding(model: &str, dimension: usize, raw: Vec<f64>) -> Result<Embedding, DomainError> {
    let embedding = Embedding::new(raw.into_iter().map(|x| x as f32).collect());
    embedding.ensure_dimension(dimension).map_err(|_| {
        DomainError::embedding(format!(
            "{model} returned {} dimensions, configured for {dimension}",
            embedding.dimension()
        ))
    })?;
    Ok(embedding)
}

fn check_batch(requested: usize, received: usize) -> Result<(), DomainError> {
    if requested != received {
        return Err(DomainError::embedding(format!(
            "requested {requested} embeddings, received {received}"
        )));
    }
    Ok(())
}

#[async_trait]
impl EmbeddingService for GeminiEmbedding {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let model = self.client.embedding_model(&self.model);
        let embedding = model
            .embed_text(text)
            .await
            .map_err(|e| DomainError::embedding(e.to_string()))?;
        self.convert(embedding.vec)
    }

    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.client.embedding_model(&self.model);
        let mut out = Vec::with_capacity(texts.len());

        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            let embeddings = model
                .embed_texts(batch.iter().map(|t| t.to_string()))
                .await
                .map_err(|e| DomainError::embedding(e.to_string()))?;

            check_batch(batch.len(), embeddings.len())?;
            debug!(batch = i, size = batch.len(), "embedded batch");

            for embedding in embeddings {
                out.push(self.convert(embedding.vec)?);
            }
        }

        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
