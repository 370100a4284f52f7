use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{classify, emails, handlers, scrape, speakers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Classification
        .route("/categories", get(classify::list_categories))
        .route("/classify", post(classify::classify_company))
        // Email generation
        .route("/emails/generate", post(emails::generate_email))
        // Scraping
        .route("/scrape", post(scrape::scrape_speakers))
        // Batch processing
        .route("/speakers/process", post(speakers::process_speakers))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
