//! Company classification handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use outreach_core::CompanyCategory;

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub company_name: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub company_name: String,
    pub category: String,
    pub confidence: f32,
    pub reasoning: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub label: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/categories
///
/// List the category taxonomy with descriptions.
pub async fn list_categories() -> Json<CategoriesResponse> {
    let categories = CompanyCategory::ALL
        .iter()
        .map(|c| CategoryInfo {
            label: c.label().to_string(),
            description: c.description().to_string(),
        })
        .collect();
    Json(CategoriesResponse { categories })
}

/// POST /api/v1/classify
///
/// Classify a single company. Infallible at the classification level: an
/// unconfigured or failing backend degrades to Other.
pub async fn classify_company(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, impl IntoResponse> {
    let company_name = body.company_name.trim().to_string();
    if company_name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Company name must not be empty".to_string(),
            }),
        ));
    }

    let verdict = state.classifier().classify_with_verdict(&company_name).await;
    let category = verdict.resolved_category();
    Ok(Json(ClassifyResponse {
        company_name,
        category: category.label().to_string(),
        confidence: verdict.confidence,
        reasoning: verdict.reasoning,
        description: category.description().to_string(),
    }))
}
