mod answer;
mod chunk;
mod conversation;
mod document;
mod embedding;
mod fingerprint;
mod prompt;
mod retrieval;

pub use answer::{Answer, Citation};
pub use chunk::{split_pages, CharSpan, Chunk, ChunkingParams};
pub use conversation::{ConversationTurn, Role, Session};
pub use document::{display_name, Page, SourceDocument};
pub use embedding::{Embedding, IndexEntry};
pub use fingerprint::Fingerprint;
pub use prompt::{PromptTemplate, ReplyFormat};
pub use retrieval::{RetrievalResult, SearchResult};
