//! Message listing route.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use courier_common::error::AppError;
use courier_common::types::Message;

use super::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/messages", get(list_messages))
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    /// `pending`, `sent`, or absent/blank for every status.
    pub status: Option<String>,
}

/// GET /messages?status=: List messages, oldest first.
async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<ApiResult<Vec<Message>>>, AppError> {
    let messages = state.messages.retrieve(query.status.as_deref()).await?;
    Ok(Json(ApiResult::data(messages)))
}
