//! HTTP delivery client for the external notification endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use courier_common::types::{DeliveryAck, DeliveryRequest};

use crate::error::DeliveryError;

/// Header carrying the endpoint credential.
pub const AUTH_HEADER: &str = "x-ins-auth-key";

/// Default bound on a single delivery call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can hand a message to the delivery endpoint.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, request: &DeliveryRequest) -> Result<DeliveryAck, DeliveryError>;
}

/// Posts messages as JSON to a webhook-style endpoint.
///
/// Only `202 Accepted` counts as success; any other status is a failure for
/// that message.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
    auth_key: String,
}

impl WebhookClient {
    pub fn new(
        url: impl Into<String>,
        auth_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            url: url.into(),
            auth_key: auth_key.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MessageSender for WebhookClient {
    async fn send(&self, request: &DeliveryRequest) -> Result<DeliveryAck, DeliveryError> {
        // `.json` also sets `Content-Type: application/json`.
        let response = self
            .http
            .post(&self.url)
            .header(AUTH_HEADER, &self.auth_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::ACCEPTED => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(DeliveryError::Auth(status));
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                return Err(DeliveryError::Rejected { status, body });
            }
        }

        let body = response.bytes().await?;
        let ack: DeliveryAck = serde_json::from_slice(&body)
            .map_err(|e| DeliveryError::Decode(format!("invalid acknowledgment body: {}", e)))?;

        tracing::debug!(ack_id = %ack.message_id, status = %ack.message, "Delivery acknowledged");
        Ok(ack)
    }
}
