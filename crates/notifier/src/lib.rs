//! Outbound side of message delivery.
//!
//! - [`client`] posts a message to the delivery endpoint and parses its acknowledgment
//! - [`cache`] records when each acknowledgment was received, keyed by its id

pub mod cache;
pub mod client;
pub mod error;

pub use cache::{DispatchCache, InMemoryDispatchCache, RedisDispatchCache};
pub use client::{MessageSender, WebhookClient};
pub use error::DeliveryError;
