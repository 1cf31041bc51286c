use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/create/", post(handlers::create_table))
        .route(
            "/toggle/:table_id/",
            post(handlers::toggle).fallback(handlers::invalid_request),
        )
        .route("/api/tables", get(handlers::list_tables))
        .with_state(state)
}
