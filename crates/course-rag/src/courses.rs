//! Course records touched by ingestion
//!
//! Course persistence belongs to the wider LMS. The knowledge service only
//! needs to check that a course exists, append document metadata after an
//! upload, and read uploaded text back as a quiz source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::response::CourseResponse;
use crate::types::ExtractedDocument;

/// A course and the documents uploaded to it
#[derive(Debug, Clone)]
pub struct CourseRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub documents: Vec<ExtractedDocument>,
    pub created_at: DateTime<Utc>,
}

impl CourseRecord {
    /// API view: document metadata without the extracted text
    pub fn to_response(&self) -> CourseResponse {
        CourseResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            documents: self.documents.iter().map(|d| d.metadata()).collect(),
            created_at: self.created_at,
        }
    }
}

/// Record store collaborator
#[async_trait]
pub trait CourseRecordStore: Send + Sync {
    async fn create_course(&self, title: &str, description: &str) -> Result<CourseRecord>;

    /// Fails with `CourseNotFound` for unknown ids
    async fn get_course(&self, course_id: &str) -> Result<CourseRecord>;

    /// Append documents in order; returns the course's new document count
    async fn append_documents(
        &self,
        course_id: &str,
        documents: Vec<ExtractedDocument>,
    ) -> Result<usize>;

    async fn course_documents(&self, course_id: &str) -> Result<Vec<ExtractedDocument>> {
        Ok(self.get_course(course_id).await?.documents)
    }
}

/// Process-local record store
#[derive(Default)]
pub struct InMemoryCourseStore {
    courses: DashMap<String, CourseRecord>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRecordStore for InMemoryCourseStore {
    async fn create_course(&self, title: &str, description: &str) -> Result<CourseRecord> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::invalid("course title is required"));
        }

        let record = CourseRecord {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.trim().to_string(),
            documents: Vec::new(),
            created_at: Utc::now(),
        };
        self.courses.insert(record.id.clone(), record.clone());

        tracing::info!("Created course {} ({})", record.id, record.title);
        Ok(record)
    }

    async fn get_course(&self, course_id: &str) -> Result<CourseRecord> {
        self.courses
            .get(course_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::CourseNotFound(course_id.to_string()))
    }

    async fn append_documents(
        &self,
        course_id: &str,
        documents: Vec<ExtractedDocument>,
    ) -> Result<usize> {
        let mut entry = self
            .courses
            .get_mut(course_id)
            .ok_or_else(|| Error::CourseNotFound(course_id.to_string()))?;
        entry.documents.extend(documents);
        Ok(entry.documents.len())
    }
}
