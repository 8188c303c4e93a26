//! Course question endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{
    query::AskRequest,
    response::{Answer, ChatHistoryResponse},
};

/// POST /api/courses/:course_id/ask - Answer a question from course material
pub async fn ask_question(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>> {
    tracing::info!("Question for course {}: \"{}\"", course_id, request.question);

    let answer = state
        .knowledge()
        .answer_question(&request.question, &course_id)
        .await?;

    Ok(Json(answer))
}

/// GET /api/courses/:course_id/chat-history - History is not kept
pub async fn chat_history(Path(course_id): Path<String>) -> Json<ChatHistoryResponse> {
    Json(ChatHistoryResponse::empty(course_id))
}
