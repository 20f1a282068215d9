use reqwest::StatusCode;
use thiserror::Error;

/// Failure to hand a single message to the delivery endpoint.
///
/// Always scoped to one message: the worker logs it and moves on.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Delivery endpoint refused credentials ({0})")]
    Auth(StatusCode),

    #[error("Delivery endpoint rejected message ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("Decode error: {0}")]
    Decode(String),
}
