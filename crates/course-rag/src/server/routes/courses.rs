//! Course record endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{query::CreateCourseRequest, response::CourseResponse};

/// POST /api/courses - Create a course
pub async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>)> {
    let course = state
        .courses()
        .create_course(&request.title, &request.description)
        .await?;

    Ok((StatusCode::CREATED, Json(course.to_response())))
}

/// GET /api/courses/:course_id - Course with its document metadata
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>> {
    let course = state.courses().get_course(&course_id).await?;
    Ok(Json(course.to_response()))
}
