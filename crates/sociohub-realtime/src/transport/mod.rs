//! Transport layer.
//!
//! The session manager only sees these two traits: a [`Transport`] opens an
//! authenticated [`Link`], and a `Link` carries decoded frames both ways.
//! `ws` is the WebSocket implementation; tests plug in scripted transports.

pub mod codec;
pub mod ws;

use async_trait::async_trait;

use sociohub_core::error::Result;
use sociohub_core::protocol::{InboundFrame, OutboundFrame};

pub use ws::{WsLink, WsTransport};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection authenticated by `token`.
    ///
    /// Must return `SocioHubError::AuthFailed` when the server rejects the
    /// credential; every other error is treated as transient.
    async fn connect(&self, token: &str) -> Result<Box<dyn Link>>;
}

#[async_trait]
pub trait Link: Send {
    /// Next frame. `None` once the peer closed the connection.
    ///
    /// A `BadRequest` error means one undecodable frame; the link stays usable.
    /// Must be cancel-safe.
    async fn recv(&mut self) -> Option<Result<InboundFrame>>;

    async fn send(&mut self, frame: &OutboundFrame) -> Result<()>;

    /// Best-effort close. Safe to call more than once.
    async fn close(&mut self);
}
