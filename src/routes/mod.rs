//! Router assembly: browser API endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

#[cfg(test)]
mod tests;

/// Build the application router with:
/// - the browser API under `/api/...`, each route mirroring one backend resource
/// - JSON error fallbacks for unknown paths (404) and unsupported methods (405)
/// - CORS (allow any origin/method/headers), adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(http::http_health))
        .route("/api/auth/logout", post(http::http_logout))
        .route("/api/admin/db/tables", get(http::http_admin_db_tables))
        .route("/api/chat", post(http::http_post_chat))
        .route("/api/notes/pages", post(http::http_post_note_page))
        .route("/api/notes/sections", post(http::http_post_note_section))
        .route("/api/official-questions/subjects", get(http::http_official_subjects))
        .route("/api/official-questions/years", get(http::http_official_years))
        .route("/api/problems/subjects", get(http::http_problem_subjects))
        .route("/api/problems/years", get(http::http_problem_years))
        .route("/api/problems/:metadata_id", get(http::http_problem_detail))
        .route("/api/review", post(http::http_post_review))
        .route("/api/review/:submission_id", get(http::http_get_review))
        .route(
            "/api/review/:submission_id/paragraphs/:paragraph",
            get(http::http_get_review_paragraph),
        )
        .route("/api/short-answer/sessions", post(http::http_post_short_answer_session))
        .route("/api/study-tags/:tag_id", delete(http::http_delete_study_tag))
        .route("/api/subscriptions/cancel", post(http::http_cancel_subscription))
        .route("/api/dashboard/items", get(http::http_dashboard_items))
        // Unknown routes and wrong methods answer in the `{error}` shape too
        .fallback(http::http_not_found)
        .method_not_allowed_fallback(http::http_method_not_allowed)
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
