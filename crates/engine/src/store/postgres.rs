use async_trait::async_trait;
use sqlx::PgPool;

use courier_common::error::AppError;
use courier_common::types::{Message, MessageStatus, validate_outbound};

use super::MessageStore;

/// PostgreSQL-backed message store.
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Queue a new `pending` message and return the stored row.
    pub async fn enqueue(&self, phone_number: &str, content: &str) -> Result<Message, AppError> {
        validate_outbound(phone_number, content)?;

        let message: Message = sqlx::query_as(
            r#"
            INSERT INTO messages (phone_number, content, status)
            VALUES ($1, $2, $3)
            RETURNING id, phone_number, content, status, created_at, sent_at
            "#,
        )
        .bind(phone_number)
        .bind(content)
        .bind(MessageStatus::Pending.to_string())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(message_id = message.id, "Message queued");
        Ok(message)
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn fetch_by_status(
        &self,
        status: Option<MessageStatus>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let messages: Vec<Message> = sqlx::query_as(
            r#"
            SELECT id, phone_number, content, status, created_at, sent_at
            FROM messages
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at ASC, id ASC
            LIMIT $2
            "#,
        )
        .bind(status.map(|s| s.to_string()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn update_status(&self, id: i64, status: MessageStatus) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET status = $1,
                sent_at = CASE WHEN $1 = 'sent' THEN NOW() ELSE sent_at END
            WHERE id = $2 AND status = 'pending'
            "#,
        )
        .bind(status.to_string())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(message_id = id, "Status update matched no pending row");
        }

        Ok(())
    }
}
