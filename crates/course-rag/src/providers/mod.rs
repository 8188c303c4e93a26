//! Provider abstractions for embeddings and text generation
//!
//! The knowledge service only talks to these traits; the Ollama
//! implementations are the default backend.

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::{with_timeout, LlmProvider};
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
