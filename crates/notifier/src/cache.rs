//! Dispatch cache: records when the delivery endpoint acknowledged a message.
//!
//! Entries are advisory lookup data, not part of the delivery contract: a
//! failed write is logged and otherwise ignored.
//!
//! Layout: hash `message_id:<ack id>` with a single `sending_time` field
//! holding an RFC 3339 UTC timestamp.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;

use courier_common::error::AppError;

/// Prefix shared by every dispatch entry key.
pub const DISPATCH_KEY_PREFIX: &str = "message_id:";

/// Hash field holding the acknowledgment time.
pub const SENDING_TIME_FIELD: &str = "sending_time";

/// Cache key for an acknowledgment id.
pub fn dispatch_key(ack_id: &str) -> String {
    format!("{}{}", DISPATCH_KEY_PREFIX, ack_id)
}

/// Timestamp text stored under `sending_time`, e.g. `2025-03-01T12:00:00Z`.
pub fn format_sending_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Best-effort recorder of dispatch times.
#[async_trait]
pub trait DispatchCache: Send + Sync {
    /// Record the acknowledgment time. Implementations swallow their own
    /// failures; callers never see one.
    async fn record_dispatch(&self, ack_id: &str, at: DateTime<Utc>);

    /// Look up the recorded `sending_time` for an acknowledgment id.
    async fn sending_time(&self, ack_id: &str) -> Result<Option<String>, AppError>;
}

/// Redis-backed dispatch cache.
#[derive(Clone)]
pub struct RedisDispatchCache {
    redis: ConnectionManager,
}

impl RedisDispatchCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    async fn write(&self, key: &str, sending_time: &str) -> Result<(), AppError> {
        let mut conn = self.redis.clone();
        conn.hset::<_, _, _, ()>(key, SENDING_TIME_FIELD, sending_time)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DispatchCache for RedisDispatchCache {
    async fn record_dispatch(&self, ack_id: &str, at: DateTime<Utc>) {
        let key = dispatch_key(ack_id);
        let sending_time = format_sending_time(at);

        match self.write(&key, &sending_time).await {
            Ok(()) => tracing::debug!(key = %key, sending_time = %sending_time, "Dispatch cached"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Failed to cache dispatch time"),
        }
    }

    async fn sending_time(&self, ack_id: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.redis.clone();
        let value: Option<String> = conn.hget(dispatch_key(ack_id), SENDING_TIME_FIELD).await?;
        Ok(value)
    }
}

/// In-process dispatch cache holding the same key/field layout as Redis.
#[derive(Debug, Default)]
pub struct InMemoryDispatchCache {
    entries: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl InMemoryDispatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys written so far, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl DispatchCache for InMemoryDispatchCache {
    async fn record_dispatch(&self, ack_id: &str, at: DateTime<Utc>) {
        self.entries
            .lock()
            .await
            .entry(dispatch_key(ack_id))
            .or_default()
            .insert(SENDING_TIME_FIELD.to_string(), format_sending_time(at));
    }

    async fn sending_time(&self, ack_id: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .entries
            .lock()
            .await
            .get(&dispatch_key(ack_id))
            .and_then(|fields| fields.get(SENDING_TIME_FIELD).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_dispatch_key_uses_prefix() {
        assert_eq!(dispatch_key("A1"), "message_id:A1");
    }

    #[test]
    fn test_sending_time_is_rfc3339_utc() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(format_sending_time(at), "2025-03-01T12:30:05Z");
        assert!(DateTime::parse_from_rfc3339(&format_sending_time(Utc::now())).is_ok());
    }

    #[tokio::test]
    async fn test_in_memory_cache_records_sending_time() {
        let cache = InMemoryDispatchCache::new();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

        cache.record_dispatch("A2", at).await;
        cache.record_dispatch("A1", at).await;

        assert_eq!(cache.keys().await, vec!["message_id:A1", "message_id:A2"]);
        assert_eq!(
            cache.sending_time("A1").await.unwrap().as_deref(),
            Some("2025-03-01T08:00:00Z")
        );
        assert_eq!(cache.sending_time("missing").await.unwrap(), None);
    }
}
