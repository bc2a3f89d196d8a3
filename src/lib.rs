//! Retrieval-augmented question answering over a music theory reference.

pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod testing;
