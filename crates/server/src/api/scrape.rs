//! Speaker scraping handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/scrape
///
/// Fetch a speaker listing page and return the extracted speakers as a
/// `name,title,company` CSV ready for upload to `/speakers/process`.
pub async fn scrape_speakers(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScrapeRequest>,
) -> Result<Response, ApiError> {
    if body.url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "URL must not be empty".to_string(),
            }),
        ));
    }

    let speakers = state
        .scraper()
        .scrape_url(body.url.trim())
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    let csv_bytes = state.scraper().to_csv(&speakers).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"speakers.csv\"".to_string(),
            ),
            (
                header::HeaderName::from_static("x-speaker-count"),
                speakers.len().to_string(),
            ),
        ],
        csv_bytes,
    )
        .into_response();

    Ok(response)
}
