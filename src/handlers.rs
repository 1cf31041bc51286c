use crate::client::CSRF_HEADER;
use crate::errors::AppError;
use crate::models::{TablesResponse, ToggleResponse};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, Redirect},
    Json,
};
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.lock().await;
    Html(render_index(&state.csrf_token, &data))
}

pub async fn list_tables(State(state): State<AppState>) -> Json<TablesResponse> {
    let data = state.data.lock().await;
    Json(TablesResponse {
        tables: data.ordered().into_iter().cloned().collect(),
    })
}

pub async fn toggle(
    State(state): State<AppState>,
    Path(table_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ToggleResponse>, AppError> {
    check_csrf(&state, &headers)?;

    let table_id: u32 = table_id
        .parse()
        .map_err(|_| AppError::not_found(format!("no table {table_id}")))?;

    let mut data = state.data.lock().await;
    let mut updated = data.clone();
    let is_occupied = {
        let table = updated
            .tables
            .get_mut(&table_id)
            .ok_or_else(|| AppError::not_found(format!("no table {table_id}")))?;
        table.is_occupied = !table.is_occupied;
        table.is_occupied
    };

    // the board only changes once the file has it
    persist_data(&state.data_path, &updated).await?;
    *data = updated;
    info!(table_id, is_occupied, "table toggled");

    Ok(Json(ToggleResponse {
        is_occupied: Some(is_occupied),
    }))
}

pub async fn create_table(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    check_csrf(&state, &headers)?;

    let mut data = state.data.lock().await;
    let mut updated = data.clone();
    let table = updated.add_table();
    persist_data(&state.data_path, &updated).await?;
    *data = updated;
    info!(table_id = table.id, number = table.number, "table created");

    Ok(Redirect::to("/"))
}

/// Any method other than POST on the toggle route.
pub async fn invalid_request() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "Invalid request" })),
    )
}

fn check_csrf(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let supplied = headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if supplied.is_empty() || supplied != &*state.csrf_token {
        return Err(AppError::forbidden("csrf token missing or incorrect"));
    }
    Ok(())
}
