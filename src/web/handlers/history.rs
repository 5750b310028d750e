//! Analysis history endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::web::responses::{handle_error, HistoryEntryResponse, HistoryListResponse};
use crate::web::AppState;

/// Cached analyses, most recently used first
pub async fn list_history(State(state): State<AppState>) -> Json<HistoryListResponse> {
    Json(HistoryListResponse {
        success: true,
        entries: state.analysis.history().await,
    })
}

pub async fn get_history_entry(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Response {
    match state.analysis.history_entry(&hash).await {
        Ok(entry) => Json(HistoryEntryResponse {
            success: true,
            entry,
        })
        .into_response(),
        Err(e) => handle_error(e),
    }
}

pub async fn clear_history(State(state): State<AppState>) -> StatusCode {
    state.analysis.clear_history().await;
    StatusCode::NO_CONTENT
}
