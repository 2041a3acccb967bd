//! Dispatcher module exports.
//!
//! Re-exports the dispatcher and handler trait so downstream consumers can
//! register their own event handlers.

pub mod dispatcher;

pub use dispatcher::{Dispatcher, EventHandler};
