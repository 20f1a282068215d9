//! HTTP surface for the delivery worker and the message listing.
//!
//! - `GET|POST /start`, `GET|POST /stop`: control the delivery worker
//! - `GET /status`: whether the worker loop is active
//! - `GET /messages?status=`: list messages, oldest first
//! - `GET /dispatches/{message_id}`: recorded acknowledgment time
//! - `GET /health`: liveness probe

pub mod routes;
pub mod state;
