//! Dispatch lookup route.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use courier_common::error::AppError;

use super::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/dispatches/{message_id}", get(get_dispatch))
}

#[derive(Debug, Serialize)]
pub struct Dispatch {
    pub message_id: String,
    pub sending_time: String,
}

/// GET /dispatches/:message_id: When the endpoint acknowledged a message.
///
/// `message_id` is the identifier assigned by the delivery endpoint.
async fn get_dispatch(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<Json<ApiResult<Dispatch>>, AppError> {
    let sending_time = state
        .dispatches
        .sending_time(&message_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No dispatch recorded for {}", message_id)))?;

    Ok(Json(ApiResult::data(Dispatch {
        message_id,
        sending_time,
    })))
}
