//! Batch speaker processing: CSV upload in, processed CSV out.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use outreach_core::PipelineError;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProcessParams {
    /// Per-request override for the configured speaker cap
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/speakers/process?limit=N
///
/// Accept a speaker CSV as a multipart upload, run the full classify +
/// generate pipeline over it, and return the processed CSV. The run summary
/// travels in the `x-run-summary` header so the body stays a plain file.
pub async fn process_speakers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProcessParams>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("speakers.csv").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("Failed to read upload: {e}")))?;
            upload = Some((filename, bytes.to_vec()));
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(bad_request("Missing 'file' field in multipart payload"));
    };
    if !filename.to_ascii_lowercase().ends_with(".csv") {
        return Err(bad_request("Only CSV uploads are accepted"));
    }

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let processing = &state.config().processing;
    let input_path: PathBuf = processing.input_dir.join(format!("upload_{stamp}.csv"));
    let output_path: PathBuf = processing
        .output_dir
        .join(format!("speaker_emails_{stamp}.csv"));

    if let Some(parent) = input_path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            error!("Failed to create input directory: {}", e);
            internal_error(e)
        })?;
    }
    tokio::fs::write(&input_path, &bytes)
        .await
        .map_err(|e| internal_error(e))?;
    info!(
        path = %input_path.display(),
        bytes = bytes.len(),
        "Stored uploaded speaker list"
    );

    let summary = state
        .pipeline()
        .process_file(&input_path, &output_path, params.limit)
        .await
        .map_err(|e| match e {
            PipelineError::MissingColumns { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ),
            other => internal_error(other),
        })?;

    let csv_bytes = tokio::fs::read(&output_path)
        .await
        .map_err(|e| internal_error(e))?;

    let summary_json = serde_json::to_string(&summary).unwrap_or_default();
    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"speaker_emails.csv\"".to_string(),
            ),
            (
                header::HeaderName::from_static("x-run-summary"),
                summary_json,
            ),
        ],
        csv_bytes,
    )
        .into_response();

    Ok(response)
}

fn internal_error(e: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
