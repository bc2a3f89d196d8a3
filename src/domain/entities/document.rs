use serde::{Deserialize, Serialize};

/// A loaded source document: its identifier and its pages in physical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pages: Vec<Page>,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id: id.into(),
            pages,
        }
    }

    /// Builds a document from raw page texts, numbering pages from 1.
    pub fn from_page_texts<I, S>(id: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page::new(i + 1, text))
            .collect();
        Self::new(id, pages)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Display name of the document: the last path component of its id.
    pub fn name(&self) -> &str {
        display_name(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page_number: usize,
    pub text: String,
}

impl Page {
    pub fn new(page_number: usize, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// Reduces a source id to its basename. Both separators are accepted so ids
/// recorded on one platform display the same on another.
pub fn display_name(source_id: &str) -> &str {
    source_id
        .rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(source_id)
}
