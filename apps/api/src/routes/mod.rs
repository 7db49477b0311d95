pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::optimizer::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes", post(handlers::handle_create_resume))
        .route("/api/v1/resumes/:id", get(handlers::handle_get_resume))
        .route(
            "/api/v1/resumes/:id/optimize",
            post(handlers::handle_optimize_resume),
        )
        .with_state(state)
}
