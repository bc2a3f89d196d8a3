use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::Page;
use crate::domain::errors::{DomainError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingParams {
    pub max_size: usize,
    pub overlap: usize,
}

impl ChunkingParams {
    pub fn new(max_size: usize, overlap: usize) -> Result<Self> {
        let params = Self { max_size, overlap };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(DomainError::InvalidChunking(
                "max_size must be greater than zero".into(),
            ));
        }
        if self.overlap >= self.max_size {
            return Err(DomainError::InvalidChunking(format!(
                "overlap ({}) must be smaller than max_size ({})",
                self.overlap, self.max_size
            )));
        }
        Ok(())
    }

    fn step(&self) -> usize {
        self.max_size - self.overlap
    }
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            max_size: 1000,
            overlap: 200,
        }
    }
}

/// Half-open character range `[start, end)` within a page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

impl CharSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Uuid,
    pub source_id: String,
    pub page_number: usize,
    pub text: String,
    pub span: CharSpan,
}

impl Chunk {
    fn new(
        source_id: &str,
        page_number: usize,
        text: String,
        span: CharSpan,
        params: ChunkingParams,
    ) -> Self {
        let key = format!(
            "{source_id}|{page_number}|{}|{}|{}|{}",
            span.start, span.end, params.max_size, params.overlap
        );
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()),
            source_id: source_id.to_string(),
            page_number,
            text,
            span,
        }
    }
}

/// Splits pages into overlapping chunks of at most `max_size` characters.
///
/// Windows never cross a page boundary: each page is split on its own and
/// every chunk's span is relative to its page. Window starts advance by
/// `max_size - overlap`. A window that does not reach the end of its page is
/// cut after the last paragraph break (or, failing that, sentence end) found
/// in its final `overlap` characters, and hard-cut at `max_size` otherwise.
/// Whitespace-only windows are dropped, so consecutive chunks of a page
/// overlap except where a whitespace run spans a whole window between them.
///
/// Offsets count Unicode scalar values, not bytes.
pub fn split_pages(
    source_id: &str,
    pages: &[Page],
    params: ChunkingParams,
) -> Result<Vec<Chunk>> {
    params.validate()?;

    let mut chunks = Vec::new();
    for page in pages {
        let chars: Vec<char> = page.text.chars().collect();
        if chars.iter().all(|c| c.is_whitespace()) {
            continue;
        }

        let len = chars.len();
        let mut start = 0;
        loop {
            let hard_end = (start + params.max_size).min(len);
            let end = if hard_end < len {
                break_point(&chars, hard_end, params.overlap)
            } else {
                len
            };

            let text: String = chars[start..end].iter().collect();
            if !text.trim().is_empty() {
                let span = CharSpan { start, end };
                chunks.push(Chunk::new(source_id, page.page_number, text, span, params));
            }

            if end == len {
                break;
            }
            start += params.step();
        }
    }

    Ok(chunks)
}

/// Picks the cut position for a window ending at `hard_end`. Candidates lie in
/// `(hard_end - overlap, hard_end]`, which keeps the overlap with the next
/// window non-empty.
fn break_point(chars: &[char], hard_end: usize, overlap: usize) -> usize {
    if overlap == 0 {
        return hard_end;
    }
    let lowest = hard_end - overlap + 1;
    let candidates = || (lowest..=hard_end).rev();

    candidates()
        .find(|&p| p >= 2 && chars[p - 2] == '\n' && chars[p - 1] == '\n')
        .or_else(|| candidates().find(|&p| is_sentence_end(chars, p)))
        .unwrap_or(hard_end)
}

fn is_sentence_end(chars: &[char], p: usize) -> bool {
    if p == 0 {
        return false;
    }
    let followed_by_space = chars.get(p).map_or(true, |c| c.is_whitespace());
    match chars[p - 1] {
        '\n' => true,
        '.' | '!' | '?' => followed_by_space,
        _ => false,
    }
}
