use serde::{Deserialize, Serialize};

use super::document::display_name;
use super::retrieval::RetrievalResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub page: usize,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl Answer {
    /// Pairs answer text with one citation per retrieved chunk, in retrieval
    /// order. Citations never come from the model output.
    pub fn grounded_in(text: impl Into<String>, retrieved: &RetrievalResult) -> Self {
        let citations = retrieved
            .chunks()
            .map(|chunk| Citation {
                page: chunk.page_number,
                source: display_name(&chunk.source_id).to_string(),
            })
            .collect();
        Self {
            text: text.into(),
            citations,
        }
    }

    /// Markdown rendering stored as the assistant turn: the answer followed by
    /// a sources list.
    pub fn to_markdown(&self, sources_heading: &str, page_label: &str) -> String {
        let mut out = self.text.clone();
        if self.citations.is_empty() {
            return out;
        }
        out.push_str("\n\n");
        out.push_str(sources_heading);
        out.push('\n');
        for citation in &self.citations {
            out.push_str(&format!(
                "- {page_label} {}: {}\n",
                citation.page, citation.source
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{split_pages, ChunkingParams, Page, SearchResult};

    fn retrieved() -> RetrievalResult {
        let pages = vec![Page::new(4, "Dörtlük nota."), Page::new(2, "Sekizlik nota.")];
        let chunks = split_pages("docs/Temel.pdf", &pages, ChunkingParams::default()).unwrap();
        RetrievalResult::new(
            chunks
                .into_iter()
                .zip([0.9, 0.4])
                .map(|(chunk, score)| SearchResult { chunk, score })
                .collect(),
        )
    }

    #[test]
    fn test_citations_follow_retrieval_order() {
        let answer = Answer::grounded_in("Cevap", &retrieved());
        assert_eq!(
            answer.citations,
            vec![
                Citation { page: 4, source: "Temel.pdf".into() },
                Citation { page: 2, source: "Temel.pdf".into() },
            ]
        );
    }

    #[test]
    fn test_markdown_lists_sources() {
        let answer = Answer::grounded_in("Cevap", &retrieved());
        let rendered = answer.to_markdown("**Kaynaklar:**", "Sayfa");
        assert_eq!(
            rendered,
            "Cevap\n\n**Kaynaklar:**\n- Sayfa 4: Temel.pdf\n- Sayfa 2: Temel.pdf\n"
        );
    }

    #[test]
    fn test_markdown_without_citations_is_plain_text() {
        let answer = Answer::grounded_in("Cevap", &RetrievalResult::default());
        assert_eq!(answer.to_markdown("**Kaynaklar:**", "Sayfa"), "Cevap");
    }
}
