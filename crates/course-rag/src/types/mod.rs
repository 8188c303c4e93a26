//! Core types for documents, chunks, quiz questions and API payloads

pub mod document;
pub mod query;
pub mod quiz;
pub mod response;

pub use document::{Chunk, DocumentMetadata, ExtractedDocument, FileType};
pub use quiz::{CorrectAnswer, GeneratedQuestion, QuestionType, QuizKind};
pub use response::Answer;
