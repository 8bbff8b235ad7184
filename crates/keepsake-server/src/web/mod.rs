// src/web/mod.rs
// Web server layer for Keepsake

pub mod api;
pub mod state;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::KeepsakeError;
use crate::web::state::AppState;
use keepsake_types::ApiResponse;

/// Create the web server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes (REST)
    let api_router = Router::new()
        .route("/ask", post(api::ask))
        .route("/memories", get(api::list_memories).post(api::create_memory))
        .route("/memories/{id}", get(api::get_memory))
        .route("/summaries", get(api::list_summaries))
        .route("/summaries/generate", post(api::generate_summary))
        .route("/questions", get(api::list_questions));

    Router::new()
        // Health check at root level
        .route("/health", get(api::health))
        // API routes
        .nest("/api", api_router)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for KeepsakeError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // 500-class internals are logged here, not echoed to the caller
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        (status, Json(ApiResponse::<()>::err(self.client_message()))).into_response()
    }
}
