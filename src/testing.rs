//! Deterministic stand-ins for the model services, for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    ports::{EmbeddingService, LlmService},
    DomainError, Embedding,
};

pub const FAKE_DIMENSION: usize = 16;

/// Bag-of-words hashing embedder: texts sharing words point the same way.
#[derive(Default)]
pub struct FakeEmbedding {
    pub batch_calls: AtomicUsize,
    pub single_calls: AtomicUsize,
    pub fail: AtomicBool,
    pub batch_delay: Option<Duration>,
}

impl FakeEmbedding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_delay(delay: Duration) -> Self {
        Self {
            batch_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn vector(text: &str) -> Embedding {
        let mut v = vec![0.0f32; FAKE_DIMENSION];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
                    (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
                });
            v[(hash % FAKE_DIMENSION as u64) as usize] += 1.0;
        }
        Embedding::new(v)
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::embedding("quota exceeded"));
        }
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.batch_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::embedding("quota exceeded"));
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        FAKE_DIMENSION
    }

    fn model_id(&self) -> &str {
        "fake-bow"
    }
}

/// Replies with a fixed text and records every prompt it receives.
pub struct FakeLlm {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl FakeLlm {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let llm = Self::replying("");
        llm.fail.store(true, Ordering::SeqCst);
        llm
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmService for FakeLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::generation("model unavailable"));
        }
        Ok(self.reply.clone())
    }
}
