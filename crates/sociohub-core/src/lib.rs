//! SocioHub core: transport-agnostic protocol primitives, error types, and
//! the deep-link interpreter.
//!
//! This crate defines the wire-level contracts and error surface shared by the
//! realtime client and the app shells. It carries no async runtime or
//! transport dependency.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed frames and links surface as `SocioHubError` or degrade to a
//! no-op value instead of crashing the host app.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod deeplink;
pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{Result, SocioHubError};
