//! Message delivery engine.
//!
//! - [`store`] reads and updates queued messages
//! - [`worker`] runs the periodic delivery loop and its start/stop control
//! - [`messages`] serves the read-only message listing

pub mod messages;
pub mod store;
pub mod worker;
