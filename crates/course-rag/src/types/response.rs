//! Response types for answers, ingestion and quizzes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::{Chunk, DocumentMetadata};
use super::quiz::GeneratedQuestion;

/// Answer to a student question with the chunks it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Chunk>,
    pub timestamp: DateTime<Utc>,
}

impl Answer {
    pub fn new(answer: String, sources: Vec<Chunk>) -> Self {
        Self {
            answer,
            sources,
            timestamp: Utc::now(),
        }
    }
}

/// A file that could not be processed in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestFailure {
    pub file_name: String,
    pub error: String,
}

/// Response for a document upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    /// True when at least one file was processed
    pub success: bool,
    pub processed_documents: Vec<DocumentMetadata>,
    pub failures: Vec<IngestFailure>,
    /// Chunks appended to the course index
    pub chunk_count: usize,
    pub processing_time_ms: u64,
}

/// Chat history for a course (history is not persisted)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryResponse {
    pub course_id: String,
    pub messages: Vec<serde_json::Value>,
}

impl ChatHistoryResponse {
    pub fn empty(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            messages: Vec::new(),
        }
    }
}

/// Generated quiz questions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub questions: Vec<GeneratedQuestion>,
    pub count: usize,
    pub processing_time_ms: u64,
}

/// Course record as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub documents: Vec<DocumentMetadata>,
    pub created_at: DateTime<Utc>,
}
