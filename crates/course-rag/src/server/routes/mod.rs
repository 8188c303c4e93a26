//! API routes for the course server

pub mod ask;
pub mod courses;
pub mod documents;
pub mod quizzes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::config::ServerConfig;
use crate::server::state::AppState;

/// Room for multipart framing on top of the file bytes
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build all API routes
pub fn api_routes(server: &ServerConfig) -> Router<AppState> {
    let upload_limit = server
        .max_upload_size
        .saturating_mul(server.max_files_per_request)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        // Course records
        .route("/courses", post(courses::create_course))
        .route("/courses/:course_id", get(courses::get_course))
        // Uploads - with larger body limit for files
        .route(
            "/courses/:course_id/documents",
            post(documents::upload_documents).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Questions
        .route("/courses/:course_id/ask", post(ask::ask_question))
        .route("/courses/:course_id/chat-history", get(ask::chat_history))
        // Quizzes
        .route("/quizzes/generate", post(quizzes::generate_questions))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "course-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Course knowledge service: document ingestion, course Q&A and quiz generation",
        "supportedFormats": crate::types::FileType::ALL
            .iter()
            .map(|t| t.extension())
            .collect::<Vec<_>>(),
        "endpoints": {
            "POST /api/courses": "Create a course",
            "GET /api/courses/:course_id": "Get a course and its document metadata",
            "POST /api/courses/:course_id/documents": "Upload course documents",
            "POST /api/courses/:course_id/ask": "Ask a question about a course",
            "GET /api/courses/:course_id/chat-history": "Chat history (not persisted)",
            "POST /api/quizzes/generate": "Generate quiz questions"
        }
    }))
}
