mod gemini;

pub use gemini::{gemini_client, GeminiLlm};
