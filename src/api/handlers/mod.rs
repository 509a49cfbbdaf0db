use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::api::models::ErrorResponse;
use crate::database::DbPool;
use crate::errors::LedgerError;
use crate::services::RoundPipeline;

pub mod events;
pub mod rivalries;
pub mod rounds;
pub mod series;

pub struct AppState {
    pub pool: DbPool,
    pub pipeline: RoundPipeline,
}

pub(crate) fn error_response(err: LedgerError) -> Response {
    let status = match &err {
        LedgerError::EventNotFound(_)
        | LedgerError::GroupNotInEvent { .. }
        | LedgerError::SeriesNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::RoundNotFinished(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::InvalidRoundIndex { .. } => StatusCode::BAD_REQUEST,
        LedgerError::PartialRivalryFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ErrorResponse { error: err.to_string() })).into_response()
}
