pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::connections::handlers as connections;
use crate::cv_match::handlers as cv;
use crate::state::AppState;
use crate::suggestions::handlers as suggestions;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Suggestions API
        .route(
            "/api/v1/suggestions",
            get(suggestions::handle_get_suggestions),
        )
        .route(
            "/api/v1/profiles/:user_id",
            get(suggestions::handle_get_profile),
        )
        // CV API
        .route("/api/v1/cv", put(cv::handle_upsert_cv))
        .route("/api/v1/cv/match", post(cv::handle_cv_match))
        // Connections API
        .route(
            "/api/v1/connections",
            get(connections::handle_list_connections).post(connections::handle_create_connection),
        )
        .route(
            "/api/v1/connections/:id/accept",
            post(connections::handle_accept_connection),
        )
        .route(
            "/api/v1/connections/:id",
            delete(connections::handle_delete_connection),
        )
        .with_state(state)
}
