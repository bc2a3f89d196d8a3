//! Application layer - Ingestion, retrieval and answering.
//!
//! Services here orchestrate the domain through its ports (traits); concrete
//! adapters are chosen by the caller.

pub mod services;

pub use services::{
    AnswerComposer, Assistant, DocumentService, IndexBuilder, Retriever, DEFAULT_TOP_K,
};
