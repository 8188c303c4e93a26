//! Request bodies accepted by the HTTP layer

use serde::{Deserialize, Serialize};

use super::quiz::QuizKind;

/// Question about a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Quiz generation request
///
/// The knowledge source is `content` when given, otherwise the text of
/// every document uploaded to `course_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub question_type: QuizKind,
    /// Keep only the first N questions in generation order
    #[serde(default)]
    pub count: Option<usize>,
}

/// New course record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}
