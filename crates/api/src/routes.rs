use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::resolve_query))
        .route("/dns-query", get(handlers::resolve_query))
        .with_state(state)
}
