//! Read-only message listing, independent of the delivery worker.

use std::sync::Arc;

use courier_common::error::AppError;
use courier_common::types::{Message, MessageStatus};

use crate::store::MessageStore;

/// Default upper bound on rows returned by a listing.
pub const DEFAULT_RETRIEVE_LIMIT: i64 = 1000;

/// Service layer for the message listing.
#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    limit: i64,
}

impl MessageService {
    pub fn new(store: Arc<dyn MessageStore>, limit: i64) -> Self {
        Self { store, limit }
    }

    /// List messages with the given status, oldest first.
    ///
    /// A missing or blank filter lists every status. Storage failures are
    /// logged and reported as a generic internal error with no partial rows.
    pub async fn retrieve(&self, status: Option<&str>) -> Result<Vec<Message>, AppError> {
        let filter = MessageStatus::parse_filter(status)?;

        self.store
            .fetch_by_status(filter, self.limit)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, status = ?filter, "Failed to retrieve messages");
                AppError::Internal("Failed to fetch messages".to_string())
            })
    }
}
