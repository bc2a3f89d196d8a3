//! Domain layer - Document, chunk, index and conversation types, plus the
//! ports the application drives.

pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::*;
pub use errors::{DomainError, Result};
