use tracing::{error, instrument, warn};

use super::{AnswerComposer, Retriever};
use crate::domain::{Answer, DomainError, ReplyFormat, Session};

/// One conversational turn: retrieve, compose, record.
pub struct Assistant {
    retriever: Retriever,
    composer: AnswerComposer,
    format: ReplyFormat,
}

impl Assistant {
    pub fn new(retriever: Retriever, composer: AnswerComposer, format: ReplyFormat) -> Self {
        Self {
            retriever,
            composer,
            format,
        }
    }

    /// Appends the question as a user turn, then the rendered answer as an
    /// assistant turn. Any failure is recorded as an assistant error turn and
    /// still returned; the caller stops only on [`DomainError::is_fatal`].
    #[instrument(skip(self, session, question), fields(session_id = %session.id, turns = session.len()))]
    pub async fn ask_question(
        &self,
        session: &mut Session,
        question: &str,
    ) -> Result<Answer, DomainError> {
        session.append_user(question);

        match self.answer(question).await {
            Ok(answer) => {
                session.append_assistant(self.format.answer_turn(&answer));
                Ok(answer)
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!(error = %e, "answer failed, recorded in session");
                } else {
                    error!(error = %e, fatal = e.is_fatal(), "answer failed");
                }
                session.append_assistant(self.format.error_turn(&e));
                Err(e)
            }
        }
    }

    async fn answer(&self, question: &str) -> Result<Answer, DomainError> {
        let retrieved = self.retriever.retrieve(question).await?;
        self.composer.compose(question, &retrieved).await
    }
}
