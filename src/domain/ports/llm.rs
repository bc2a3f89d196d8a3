use crate::domain::errors::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait LlmService: Send + Sync {
    /// One model invocation, no tools and no follow-up turns.
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}
