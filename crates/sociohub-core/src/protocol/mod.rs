//! Realtime wire protocol.
//!
//! Every frame on the connection is a JSON envelope `{"event": ..., "data": ...}`.
//! `frame` holds the envelope types; `events` holds the event names both sides
//! agree on and the payload shapes handlers deserialize lazily from `data`.
//!
//! Parsers never panic: malformed input surfaces as `SocioHubError::BadRequest`
//! so the caller can drop the frame and keep the connection.

pub mod events;
pub mod frame;

pub use frame::{InboundFrame, OutboundFrame};
