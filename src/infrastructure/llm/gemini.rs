use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::gemini;
use tracing::instrument;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::{ApiCredential, LlmConfig};

/// Builds a Gemini client from an injected credential. The environment is
/// never consulted.
pub fn gemini_client(credential: &ApiCredential) -> Result<gemini::Client, DomainError> {
    gemini::Client::new(credential.expose())
        .map_err(|e| DomainError::config(format!("failed to create Gemini client: {e}")))
}

pub struct GeminiLlm {
    client: gemini::Client,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl GeminiLlm {
    pub fn new(client: gemini::Client, config: &LlmConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl LlmService for GeminiLlm {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let agent = self
            .client
            .agent(&self.model)
            .temperature(self.temperature)
            .build();

        tokio::time::timeout(self.timeout, agent.prompt(prompt))
            .await
            .map_err(|_| {
                DomainError::generation(format!(
                    "model did not answer within {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| DomainError::generation(e.to_string()))
    }
}
