//! Message store gateway.
//!
//! Two operations only: a filtered, oldest-first read and a single-row status
//! update stamped with the store's clock.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use courier_common::error::AppError;
use courier_common::types::{Message, MessageStatus};

pub use memory::InMemoryMessageStore;
pub use postgres::PgMessageStore;

/// Durable storage for queued messages.
///
/// Implementations are shared between the delivery worker and the listing
/// path, so they must be safe for concurrent use.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Messages with the given status (all statuses when `None`), oldest
    /// `created_at` first, at most `limit` rows.
    async fn fetch_by_status(
        &self,
        status: Option<MessageStatus>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError>;

    /// Move the `pending` row with `id` to `status`, stamping `sent_at` with
    /// the store's current time when the new status is `sent`. Rows that are
    /// already `sent` are left untouched. An unknown `id` is not an error.
    async fn update_status(&self, id: i64, status: MessageStatus) -> Result<(), AppError>;
}
