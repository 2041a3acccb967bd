//! SocioHub realtime client library.
//!
//! This crate wires the transport, session manager, event dispatcher,
//! built-in handlers and state store into one client stack. It is consumed by
//! the headless binary (`main.rs`), by app shells, and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod obs;
pub mod session;
pub mod state;
pub mod transport;
