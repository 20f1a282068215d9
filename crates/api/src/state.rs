//! Shared application state for the Axum API server.

use std::sync::Arc;

use courier_engine::messages::MessageService;
use courier_engine::worker::DeliveryWorker;
use courier_notifier::DispatchCache;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub worker: DeliveryWorker,
    pub messages: MessageService,
    pub dispatches: Arc<dyn DispatchCache>,
}

impl AppState {
    pub fn new(
        worker: DeliveryWorker,
        messages: MessageService,
        dispatches: Arc<dyn DispatchCache>,
    ) -> Self {
        Self {
            worker,
            messages,
            dispatches,
        }
    }
}
