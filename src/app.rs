use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/endpoints/reset", post(handlers::reset_endpoints))
        .route("/api/endpoints/:intent", get(handlers::get_endpoints))
        .route("/api/users/pending", get(handlers::list_pending_users))
        .route("/api/users/:id/:intent", post(handlers::change_role))
        .route("/api/me", get(handlers::get_profile))
        .route("/api/me/employee", post(handlers::ensure_employee))
        .with_state(state)
}
