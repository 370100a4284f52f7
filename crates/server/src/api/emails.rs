//! Email generation handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use outreach_core::{CompanyCategory, EmailRequest};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateEmailRequest {
    pub speaker_name: String,
    pub speaker_title: String,
    pub company_name: String,
    /// When omitted, the company is classified first
    #[serde(default)]
    pub category: Option<CompanyCategory>,
    #[serde(default)]
    pub extra_instructions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateEmailResponse {
    pub subject: String,
    pub body: String,
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/emails/generate
///
/// Generate an outreach email for a single speaker. Classifies the company
/// first when no category is supplied. Competitors are refused rather than
/// emailed.
pub async fn generate_email(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateEmailRequest>,
) -> Result<Json<GenerateEmailResponse>, impl IntoResponse> {
    if !state.generator().is_configured() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Email generation not configured (no LLM client)".to_string(),
            }),
        ));
    }

    let category = match body.category {
        Some(category) => category,
        None => state.classifier().classify(&body.company_name).await,
    };

    if category == CompanyCategory::Competitor {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: format!(
                    "{} is classified as a competitor; no email generated",
                    body.company_name
                ),
            }),
        ));
    }

    let request = EmailRequest {
        speaker_name: body.speaker_name,
        speaker_title: body.speaker_title,
        company_name: body.company_name,
        category,
        extra_instructions: body.extra_instructions,
    };

    match state.generator().generate(&request).await {
        Ok(content) => Ok(Json(GenerateEmailResponse {
            subject: content.subject,
            body: content.body,
            category: category.label().to_string(),
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
