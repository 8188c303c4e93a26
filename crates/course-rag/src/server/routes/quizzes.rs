//! Quiz generation endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::DOCUMENT_SEPARATOR;
use crate::server::state::AppState;
use crate::types::{query::GenerateQuestionsRequest, response::QuizResponse};

/// POST /api/quizzes/generate - Generate questions from text or a course
pub async fn generate_questions(
    State(state): State<AppState>,
    Json(request): Json<GenerateQuestionsRequest>,
) -> Result<Json<QuizResponse>> {
    let start = Instant::now();

    let content = match (request.content, request.course_id) {
        (Some(content), _) if !content.trim().is_empty() => content,
        (_, Some(course_id)) => {
            let documents = state.courses().course_documents(&course_id).await?;
            if documents.is_empty() {
                return Err(Error::invalid(format!(
                    "Course {} has no uploaded documents",
                    course_id
                )));
            }
            documents
                .iter()
                .map(|d| d.text.as_str())
                .collect::<Vec<_>>()
                .join(DOCUMENT_SEPARATOR)
        }
        _ => return Err(Error::invalid("Either content or courseId is required")),
    };

    let mut questions = state
        .knowledge()
        .generate_question_variations(&content, request.question_type)
        .await?;

    if let Some(count) = request.count {
        questions.truncate(count);
    }

    Ok(Json(QuizResponse {
        count: questions.len(),
        questions,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
