use serde::{Deserialize, Serialize};

use super::answer::Answer;
use crate::domain::errors::{DomainError, Result};

const DEFAULT_TEMPLATE: &str = "\
Aşağıdaki bağlamı kullanarak soruyu yanıtla. Yalnızca bağlamdaki bilgilere dayan.
Yanıt dili: {language}. Yanıt kısa ve doğru olmalı.
Bağlamda soruyu yanıtlamaya yetecek bilgi yoksa yalnızca şu cümleyi aynen yaz: \"{fallback}\"

Bağlam:
{context}

Soru:
{question}
";

/// Instruction sent to the model for every question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplate {
    /// Placeholders: `{context}`, `{question}`, `{fallback}`, `{language}`.
    pub template: String,
    /// Sentence the model must reply with when the context does not cover
    /// the question.
    pub fallback: String,
    pub language: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            fallback: "Elimdeki müzik teorisi bilgileri bu soruyu tam olarak yanıtlamak için yetersizdir."
                .to_string(),
            language: "Türkçe".to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn validate(&self) -> Result<()> {
        for placeholder in ["{context}", "{question}", "{fallback}"] {
            if !self.template.contains(placeholder) {
                return Err(DomainError::config(format!(
                    "prompt template is missing {placeholder}"
                )));
            }
        }
        if self.fallback.trim().is_empty() {
            return Err(DomainError::config("prompt fallback must not be empty"));
        }
        Ok(())
    }

    pub fn render(&self, context: &str, question: &str) -> String {
        substitute(
            &self.template,
            &[
                ("context", context),
                ("question", question),
                ("fallback", self.fallback.as_str()),
                ("language", self.language.as_str()),
            ],
        )
    }
}

/// Single-pass substitution of `{name}` placeholders. Substituted values are
/// never rescanned, so braces inside a question or chunk text stay literal.
/// Unknown placeholders are left as written.
fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let substituted = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// User-facing wording of assistant turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyFormat {
    pub sources_heading: String,
    pub page_label: String,
    pub error_prefix: String,
}

impl Default for ReplyFormat {
    fn default() -> Self {
        Self {
            sources_heading: "**📚 Kaynaklar:**".to_string(),
            page_label: "Sayfa".to_string(),
            error_prefix: "Cevap oluşturulurken bir hata oluştu:".to_string(),
        }
    }
}

impl ReplyFormat {
    pub fn answer_turn(&self, answer: &Answer) -> String {
        answer.to_markdown(&self.sources_heading, &self.page_label)
    }

    pub fn error_turn(&self, error: &DomainError) -> String {
        format!("{} {error}", self.error_prefix)
    }
}
