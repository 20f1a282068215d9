use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use courier_common::error::AppError;
use courier_common::types::{Message, MessageStatus, validate_outbound};

use super::MessageStore;

#[derive(Debug, Default)]
struct Rows {
    messages: Vec<Message>,
    next_id: i64,
}

/// In-process message store with the same ordering and update rules as the
/// Postgres store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    rows: Mutex<Rows>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a new `pending` message created now.
    pub async fn enqueue(&self, phone_number: &str, content: &str) -> Result<Message, AppError> {
        self.enqueue_at(phone_number, content, Utc::now()).await
    }

    /// Queue a new `pending` message with an explicit creation time.
    pub async fn enqueue_at(
        &self,
        phone_number: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Message, AppError> {
        validate_outbound(phone_number, content)?;

        let mut rows = self.rows.lock().await;
        rows.next_id += 1;
        let message = Message {
            id: rows.next_id,
            phone_number: phone_number.to_string(),
            content: content.to_string(),
            status: MessageStatus::Pending,
            created_at,
            sent_at: None,
        };
        rows.messages.push(message.clone());
        Ok(message)
    }

    /// Fetch a single message by id.
    pub async fn get(&self, id: i64) -> Option<Message> {
        self.rows
            .lock()
            .await
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn fetch_by_status(
        &self,
        status: Option<MessageStatus>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let rows = self.rows.lock().await;
        let mut matching: Vec<Message> = rows
            .messages
            .iter()
            .filter(|m| status.is_none_or(|s| m.status == s))
            .cloned()
            .collect();

        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        matching.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(matching)
    }

    async fn update_status(&self, id: i64, status: MessageStatus) -> Result<(), AppError> {
        let mut rows = self.rows.lock().await;
        if let Some(message) = rows
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.is_pending())
        {
            message.status = status;
            if status == MessageStatus::Sent {
                message.sent_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}
