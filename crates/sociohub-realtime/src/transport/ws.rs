//! WebSocket transport (tokio-tungstenite).
//!
//! Handshake:
//! - the token travels both as the `token` query parameter and as an
//!   `Authorization: Bearer` header
//! - HTTP 401/403 on upgrade, or a `connect_error` frame mentioning auth, is an
//!   authentication failure
//! - otherwise the server acknowledges with `connect` (any other first frame
//!   is accepted as an implicit acknowledgement and delivered later)
//!
//! Failed handshakes are retried here a small fixed number of times with a
//! fixed delay before the error reaches the session manager. Auth failures are
//! never retried.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{header::AUTHORIZATION, HeaderValue};
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use sociohub_core::error::{Result, SocioHubError};
use sociohub_core::protocol::events::{inbound, ConnectError};
use sociohub_core::protocol::{InboundFrame, OutboundFrame};

use crate::config::RealtimeSection;
use crate::transport::codec::{self, Inbound};
use crate::transport::{Link, Transport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct WsTransport {
    endpoint: Url,
    connect_timeout: Duration,
    reconnection_attempts: u32,
    reconnection_delay: Duration,
}

impl WsTransport {
    pub fn new(cfg: &RealtimeSection) -> Result<Self> {
        Ok(Self {
            endpoint: cfg.endpoint()?,
            connect_timeout: cfg.connect_timeout(),
            reconnection_attempts: cfg.transport.reconnection_attempts,
            reconnection_delay: cfg.transport.reconnection_delay(),
        })
    }

    fn request(&self, token: &str) -> Result<Request> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("token", token);

        let mut req = url
            .as_str()
            .into_client_request()
            .map_err(|e| SocioHubError::BadRequest(format!("invalid endpoint: {e}")))?;

        // A token that cannot travel in a header can never authenticate.
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| SocioHubError::AuthFailed)?;
        req.headers_mut().insert(AUTHORIZATION, bearer);
        Ok(req)
    }

    async fn handshake(&self, token: &str) -> Result<WsLink> {
        let req = self.request(token)?;
        let (mut stream, _resp) = connect_async(req).await.map_err(classify)?;
        let pending = await_ack(&mut stream).await?;
        Ok(WsLink { stream, pending })
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, token: &str) -> Result<Box<dyn Link>> {
        let mut attempt = 0u32;
        loop {
            let err = match tokio::time::timeout(self.connect_timeout, self.handshake(token)).await {
                Ok(Ok(link)) => return Ok(Box::new(link)),
                Ok(Err(e)) if e.is_auth() => return Err(e),
                Ok(Err(e)) => e,
                Err(_) => SocioHubError::Timeout,
            };

            if attempt >= self.reconnection_attempts {
                return Err(err);
            }
            attempt += 1;
            tracing::debug!(attempt, error = %err, "ws handshake failed; retrying");
            tokio::time::sleep(self.reconnection_delay).await;
        }
    }
}

/// Wait for the server's verdict on the credential.
async fn await_ack(stream: &mut WsStream) -> Result<Option<InboundFrame>> {
    while let Some(msg) = stream.next().await {
        let msg = msg.map_err(classify)?;
        match codec::decode(msg)? {
            Inbound::Frame(f) if f.event == inbound::CONNECT => return Ok(None),
            Inbound::Frame(f) if f.event == inbound::CONNECT_ERROR => return Err(connect_error(&f)),
            Inbound::Frame(f) => return Ok(Some(f)),
            Inbound::Control => continue,
            Inbound::Close => break,
        }
    }
    Err(SocioHubError::Transport(
        "connection closed during handshake".into(),
    ))
}

fn connect_error(f: &InboundFrame) -> SocioHubError {
    let err: ConnectError = f.data_as().unwrap_or(ConnectError {
        message: String::new(),
    });
    if err.is_auth() {
        SocioHubError::AuthFailed
    } else {
        SocioHubError::Transport(format!("connect_error: {}", err.message))
    }
}

fn classify(e: WsError) -> SocioHubError {
    match e {
        WsError::Http(resp) => match resp.status().as_u16() {
            401 | 403 => SocioHubError::AuthFailed,
            code => SocioHubError::Transport(format!("upgrade rejected: http {code}")),
        },
        other => SocioHubError::Transport(other.to_string()),
    }
}

/// One live WebSocket connection.
pub struct WsLink {
    stream: WsStream,
    /// First frame when the server skipped the explicit `connect` ack.
    pending: Option<InboundFrame>,
}

#[async_trait]
impl Link for WsLink {
    async fn recv(&mut self) -> Option<Result<InboundFrame>> {
        if let Some(f) = self.pending.take() {
            return Some(Ok(f));
        }
        loop {
            let msg = match self.stream.next().await? {
                Ok(m) => m,
                Err(e) => return Some(Err(classify(e))),
            };
            match codec::decode(msg) {
                Ok(Inbound::Frame(f)) if f.event == inbound::CONNECT_ERROR => {
                    return Some(Err(connect_error(&f)))
                }
                Ok(Inbound::Frame(f)) => return Some(Ok(f)),
                Ok(Inbound::Control) => continue,
                Ok(Inbound::Close) => return None,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    async fn send(&mut self, frame: &OutboundFrame) -> Result<()> {
        let msg = codec::encode(frame)?;
        self.stream.send(msg).await.map_err(classify)
    }

    async fn close(&mut self) {
        match tokio::time::timeout(CLOSE_TIMEOUT, self.stream.close(None)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "ws close failed"),
            Err(_) => tracing::debug!("ws close timed out"),
        }
    }
}
