pub mod dispatches;
pub mod health;
pub mod messages;
pub mod worker;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct ApiResult<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> ApiResult<T> {
    pub fn data(data: T) -> Self {
        Self {
            message: None,
            data,
        }
    }
}

impl ApiResult<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            data: (),
        }
    }
}

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(worker::router())
        .merge(messages::router())
        .merge(dispatches::router())
        .with_state(state)
}
