use serde::{Deserialize, Serialize};

use super::chunk::Chunk;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
}

/// Top-k hits ordered by descending score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    hits: Vec<SearchResult>,
}

impl RetrievalResult {
    /// Wraps hits that are already ranked. Callers own the ordering.
    pub fn new(hits: Vec<SearchResult>) -> Self {
        Self { hits }
    }

    pub fn hits(&self) -> &[SearchResult] {
        &self.hits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult> {
        self.hits.iter()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn best_score(&self) -> Option<f32> {
        self.hits.first().map(|h| h.score)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.hits.iter().map(|h| &h.chunk)
    }
}

impl<'a> IntoIterator for &'a RetrievalResult {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
