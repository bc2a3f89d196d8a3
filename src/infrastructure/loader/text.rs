use std::path::Path;

use async_trait::async_trait;

use super::{read_source, source_id};
use crate::domain::{ports::DocumentLoader, DomainError, SourceDocument};

const PAGE_BREAK: char = '\u{c}';

/// Plain UTF-8 text, one page per form-feed separated section. A file without
/// form feeds is a single page.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

#[async_trait]
impl DocumentLoader for TextLoader {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, DomainError> {
        read_source(path).await
    }

    async fn parse(&self, path: &Path, bytes: Vec<u8>) -> Result<SourceDocument, DomainError> {
        let text = String::from_utf8(bytes)
            .map_err(|e| DomainError::unreadable(path, format!("not valid UTF-8: {e}")))?;

        let body = text.strip_suffix(PAGE_BREAK).unwrap_or(&text);
        Ok(SourceDocument::from_page_texts(
            source_id(path),
            body.split(PAGE_BREAK),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_form_feed_separates_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        std::fs::write(&path, "Porte\u{c}\u{c}Nota değerleri\u{c}").unwrap();

        let doc = TextLoader.load(&path).await.unwrap();
        let pages: Vec<(usize, &str)> = doc
            .pages()
            .iter()
            .map(|p| (p.page_number, p.text.as_str()))
            .collect();
        assert_eq!(pages, vec![(1, "Porte"), (2, ""), (3, "Nota değerleri")]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = TextLoader.load(&path).await.unwrap_err();
        assert!(matches!(err, DomainError::DocumentUnreadable { .. }));
    }
}
