use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::{ErrorResponse, RegisteredResponse};
use crate::database::events;
use crate::domain::EventSpec;
use crate::errors::LedgerError;

pub async fn register_event(
    State(state): State<Arc<AppState>>,
    Json(spec): Json<EventSpec>,
) -> impl IntoResponse {
    if spec.groups.is_empty() {
        return (StatusCode::BAD_REQUEST, "An event needs at least one group").into_response();
    }

    let mut conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    match events::insert_event(&mut conn, &spec) {
        Ok(created) => {
            let status = if created { StatusCode::CREATED } else { StatusCode::OK };
            (status, Json(RegisteredResponse { id: spec.event_id, created })).into_response()
        }
        Err(e @ LedgerError::SeriesNotFound(_)) => {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> impl IntoResponse {
    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };

    match events::find_event(&conn, &event_id) {
        Ok(Some(event)) => Json(event).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => error_response(e),
    }
}
