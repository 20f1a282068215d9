use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Maximum length of a destination phone number, matching the column size.
pub const MAX_PHONE_NUMBER_LEN: usize = 20;

/// Maximum length of a message body, matching the column size.
pub const MAX_CONTENT_LEN: usize = 160;

/// Message delivery status. Only ever moves from `Pending` to `Sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sent,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sent => "sent",
        }
    }

    /// Parse an optional listing filter. Missing or blank means "all statuses".
    pub fn parse_filter(raw: Option<&str>) -> Result<Option<Self>, AppError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MessageStatus::Pending),
            "sent" => Ok(MessageStatus::Sent),
            other => Err(AppError::Validation(format!(
                "Invalid status '{}'. Valid statuses: pending, sent",
                other
            ))),
        }
    }
}

/// An outbound text message queued for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub phone_number: String,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    /// Set by the store when the message is marked sent.
    pub sent_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }
}

/// Check a new message against the column bounds before it is queued.
pub fn validate_outbound(phone_number: &str, content: &str) -> Result<(), AppError> {
    if phone_number.is_empty() || phone_number.chars().count() > MAX_PHONE_NUMBER_LEN {
        return Err(AppError::Validation(format!(
            "phone_number must be 1 to {} characters",
            MAX_PHONE_NUMBER_LEN
        )));
    }
    if content.is_empty() || content.chars().count() > MAX_CONTENT_LEN {
        return Err(AppError::Validation(format!(
            "content must be 1 to {} characters",
            MAX_CONTENT_LEN
        )));
    }
    Ok(())
}

/// Body posted to the delivery endpoint for a single message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub to: String,
    pub content: String,
}

impl From<&Message> for DeliveryRequest {
    fn from(message: &Message) -> Self {
        Self {
            to: message.phone_number.clone(),
            content: message.content.clone(),
        }
    }
}

/// Acknowledgment returned by the delivery endpoint once it accepts a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAck {
    /// Identifier assigned by the endpoint, used as the dispatch cache key.
    #[serde(rename = "messageId")]
    pub message_id: String,
    /// Human-readable status text.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        assert_eq!("pending".parse::<MessageStatus>().unwrap(), MessageStatus::Pending);
        assert_eq!(MessageStatus::Sent.to_string(), "sent");
    }

    #[test]
    fn test_parse_filter_blank_means_all() {
        assert_eq!(MessageStatus::parse_filter(None).unwrap(), None);
        assert_eq!(MessageStatus::parse_filter(Some("")).unwrap(), None);
        assert_eq!(
            MessageStatus::parse_filter(Some("sent")).unwrap(),
            Some(MessageStatus::Sent)
        );
    }

    #[test]
    fn test_parse_filter_rejects_unknown_status() {
        let err = MessageStatus::parse_filter(Some("failed")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_validate_outbound_bounds() {
        assert!(validate_outbound("+905551111111", "Hi").is_ok());
        assert!(validate_outbound("", "Hi").is_err());
        assert!(validate_outbound("+905551111111", &"x".repeat(MAX_CONTENT_LEN)).is_ok());
        assert!(validate_outbound("+905551111111", &"x".repeat(MAX_CONTENT_LEN + 1)).is_err());
    }

    #[test]
    fn test_delivery_request_wire_format() {
        let message = Message {
            id: 7,
            phone_number: "+905551111111".to_string(),
            content: "Hello".to_string(),
            status: MessageStatus::Pending,
            created_at: Utc::now(),
            sent_at: None,
        };
        let json = serde_json::to_value(DeliveryRequest::from(&message)).unwrap();
        assert_eq!(json, serde_json::json!({"to": "+905551111111", "content": "Hello"}));
    }

    #[test]
    fn test_delivery_ack_reads_camel_case_id() {
        let ack: DeliveryAck =
            serde_json::from_str(r#"{"messageId": "67f2f8a8", "message": "Accepted"}"#).unwrap();
        assert_eq!(ack.message_id, "67f2f8a8");
        assert_eq!(ack.message, "Accepted");
    }
}
