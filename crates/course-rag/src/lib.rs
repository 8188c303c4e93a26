//! course-rag: Course knowledge service for a learning management system
//!
//! Uploaded course documents (PDF, Word, plain text, HTML) are extracted,
//! normalized and chunked into a per-course similarity index. Students ask
//! questions answered from retrieved chunks by a hosted language model, and
//! instructors generate quiz question sets from course material.

pub mod config;
pub mod courses;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod service;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use service::KnowledgeService;
pub use types::{
    document::{Chunk, DocumentMetadata, ExtractedDocument, FileType},
    quiz::{GeneratedQuestion, QuestionType, QuizKind},
    response::Answer,
};
