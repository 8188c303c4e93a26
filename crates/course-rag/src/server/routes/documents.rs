//! Course document upload endpoint

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::ingestion::StagedUpload;
use crate::server::state::AppState;
use crate::types::response::{IngestFailure, IngestResponse};

/// POST /api/courses/:course_id/documents - Upload and index course files
///
/// Files that fail to read or extract are reported in `failures` without
/// aborting the rest of the batch.
pub async fn upload_documents(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<IngestResponse>> {
    let start = Instant::now();
    let limits = &state.config().server;

    // Metadata is written back to the course, so it must exist
    state.courses().get_course(&course_id).await?;

    let mut uploads = Vec::new();
    let mut failures = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid(format!("Failed to read multipart field: {}", e)))?
    {
        // Non-file form fields are ignored
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        if uploads.len() + failures.len() >= limits.max_files_per_request {
            return Err(Error::invalid(format!(
                "At most {} files per upload",
                limits.max_files_per_request
            )));
        }

        let data = match field.bytes().await {
            Ok(d) => d,
            Err(e) => {
                failures.push(IngestFailure {
                    file_name,
                    error: format!("Failed to read file: {}", e),
                });
                continue;
            }
        };

        if data.len() > limits.max_upload_size {
            failures.push(IngestFailure {
                file_name,
                error: format!(
                    "File exceeds the {} byte upload limit",
                    limits.max_upload_size
                ),
            });
            continue;
        }

        tracing::info!("Received file: {} ({} bytes)", file_name, data.len());
        uploads.push(StagedUpload::stage(state.staging_dir(), file_name, data.to_vec()).await?);
    }

    if uploads.is_empty() && failures.is_empty() {
        return Err(Error::invalid("No files in upload"));
    }

    let outcome = state.processor().process_multiple_files(uploads).await;
    failures.extend(outcome.failures);

    let texts: Vec<&str> = outcome.documents.iter().map(|d| d.text.as_str()).collect();
    let chunk_count = if texts.is_empty() {
        0
    } else {
        state.knowledge().process_documents(&course_id, &texts).await?
    };

    let processed_documents: Vec<_> = outcome.documents.iter().map(|d| d.metadata()).collect();
    if !outcome.documents.is_empty() {
        state
            .courses()
            .append_documents(&course_id, outcome.documents)
            .await?;
    }

    tracing::info!(
        "Course {}: {} documents processed, {} failed, {} chunks indexed",
        course_id,
        processed_documents.len(),
        failures.len(),
        chunk_count
    );

    Ok(Json(IngestResponse {
        success: !processed_documents.is_empty(),
        processed_documents,
        failures,
        chunk_count,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}
