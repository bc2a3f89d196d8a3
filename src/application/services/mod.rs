mod assistant;
mod composer;
mod document;
mod index_builder;
mod retriever;

pub use assistant::Assistant;
pub use composer::AnswerComposer;
pub use document::DocumentService;
pub use index_builder::IndexBuilder;
pub use retriever::{Retriever, DEFAULT_TOP_K};
