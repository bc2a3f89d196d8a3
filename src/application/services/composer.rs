use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{ports::LlmService, Answer, DomainError, PromptTemplate, RetrievalResult};

/// Turns a question and its retrieved context into a grounded answer with one
/// model call.
pub struct AnswerComposer {
    llm: Arc<dyn LlmService>,
    prompts: PromptTemplate,
    min_score: Option<f32>,
}

impl AnswerComposer {
    pub fn new(llm: Arc<dyn LlmService>, prompts: PromptTemplate) -> Self {
        Self {
            llm,
            prompts,
            min_score: None,
        }
    }

    /// Below this best-hit score the model is skipped and the fallback
    /// sentence is returned.
    pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn fallback(&self) -> &str {
        &self.prompts.fallback
    }

    #[instrument(skip(self, retrieved), fields(hits = retrieved.len()))]
    pub async fn compose(
        &self,
        question: &str,
        retrieved: &RetrievalResult,
    ) -> Result<Answer, DomainError> {
        if let Some(min) = self.min_score {
            let best = retrieved.best_score();
            if best.map_or(true, |score| score < min) {
                info!(?best, min, "context below grounding threshold, model skipped");
                return Ok(Answer::grounded_in(self.prompts.fallback.clone(), retrieved));
            }
        }

        let prompt = self.build_prompt(question, retrieved);
        let text = self.llm.complete(&prompt).await?;

        Ok(Answer::grounded_in(text.trim(), retrieved))
    }

    /// Context is the retrieved chunk texts in retrieval order, separated by a
    /// blank line.
    pub fn build_prompt(&self, question: &str, retrieved: &RetrievalResult) -> String {
        let context = retrieved
            .chunks()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        self.prompts.render(&context, question)
    }
}
