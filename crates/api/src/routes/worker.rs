//! Delivery worker control routes.
//!
//! Start and stop are fire-and-forget: they always answer 200 and the effect
//! on the background loop is asynchronous.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use courier_engine::worker::{StartOutcome, StopOutcome};

use super::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", get(start_worker).post(start_worker))
        .route("/stop", get(stop_worker).post(stop_worker))
        .route("/status", get(worker_status))
}

/// Snapshot of the worker's run state and schedule.
#[derive(Debug, Serialize)]
pub struct WorkerStatus {
    pub running: bool,
    pub interval_secs: u64,
    pub batch_size: i64,
}

/// GET|POST /start: Start the delivery loop if it is not already running.
async fn start_worker(State(state): State<AppState>) -> Json<ApiResult<()>> {
    let message = match state.worker.start().await {
        StartOutcome::Started => "Message processing started",
        StartOutcome::AlreadyRunning => "Message processing is already running",
        StartOutcome::ShuttingDown => "Server is shutting down",
    };
    Json(ApiResult::message(message))
}

/// GET|POST /stop: Ask the delivery loop to stop.
async fn stop_worker(State(state): State<AppState>) -> Json<ApiResult<()>> {
    let message = match state.worker.stop().await {
        StopOutcome::Signalled => "Stop signal sent",
        StopOutcome::AlreadyStopping => "Message processing is already stopping",
        StopOutcome::NotRunning => "Message processing is already stopped",
    };
    Json(ApiResult::message(message))
}

/// GET /status: Report whether the delivery loop is active.
async fn worker_status(State(state): State<AppState>) -> Json<WorkerStatus> {
    let settings = state.worker.settings();
    Json(WorkerStatus {
        running: state.worker.is_running().await,
        interval_secs: settings.interval.as_secs(),
        batch_size: settings.batch_size,
    })
}
