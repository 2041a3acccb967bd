#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! In-memory transport with a scripted outcome per connect attempt.
//!
//! Every accepted connection hands its server side to the test through
//! [`ScriptedTransport::next_server`]: push raw JSON text with `push`, read
//! what the client emitted from `sent`. Dropping the `ServerEnd` looks like the
//! server closing the connection.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use sociohub_core::error::{Result, SocioHubError};
use sociohub_core::protocol::{InboundFrame, OutboundFrame};
use sociohub_realtime::app_state::AppState;
use sociohub_realtime::config;
use sociohub_realtime::session::{SessionManager, SessionStatus};
use sociohub_realtime::state::StateUpdate;
use sociohub_realtime::transport::{Link, Transport};

pub const BASE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accept,
    RejectAuth,
    Fail,
}

#[derive(Debug, Clone)]
pub struct Attempt {
    pub token: String,
    pub at: Instant,
}

pub struct ServerEnd {
    pub frames: mpsc::UnboundedSender<Result<String>>,
    pub sent: mpsc::UnboundedReceiver<OutboundFrame>,
}

impl ServerEnd {
    pub fn push(&self, json: &str) {
        self.frames.send(Ok(json.to_string())).expect("client link gone");
    }

    /// Revoke the credential on the live connection.
    pub fn reject_auth(&self) {
        self.frames
            .send(Err(SocioHubError::AuthFailed))
            .expect("client link gone");
    }

    pub async fn next_sent(&mut self) -> Option<OutboundFrame> {
        tokio::time::timeout(Duration::from_secs(30), self.sent.recv())
            .await
            .expect("timed out waiting for client frame")
    }
}

pub struct ScriptedTransport {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
    /// How long each handshake takes before its outcome applies.
    delay: Duration,
    attempts: Mutex<Vec<Attempt>>,
    accepted: AtomicUsize,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
    servers_tx: mpsc::UnboundedSender<ServerEnd>,
    servers_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ServerEnd>>,
}

impl ScriptedTransport {
    /// Outcomes are consumed in order; `fallback` applies once they run out.
    pub fn new(script: Vec<Outcome>, fallback: Outcome) -> Self {
        let (servers_tx, servers_rx) = mpsc::unbounded_channel();
        Self {
            script: Mutex::new(script.into()),
            fallback,
            delay: Duration::ZERO,
            attempts: Mutex::new(Vec::new()),
            accepted: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
            max_live: Arc::new(AtomicUsize::new(0)),
            servers_tx,
            servers_rx: tokio::sync::Mutex::new(servers_rx),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn push(&self, outcome: Outcome) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    /// Handshakes that completed with `Accept`.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub async fn next_server(&self) -> ServerEnd {
        let mut rx = self.servers_rx.lock().await;
        tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("transport dropped")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&self, token: &str) -> Result<Box<dyn Link>> {
        self.attempts.lock().unwrap().push(Attempt {
            token: token.to_string(),
            at: Instant::now(),
        });
        let outcome = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match outcome {
            Outcome::RejectAuth => Err(SocioHubError::AuthFailed),
            Outcome::Fail => Err(SocioHubError::Transport("connection refused".into())),
            Outcome::Accept => {
                self.accepted.fetch_add(1, Ordering::SeqCst);
                let (frames_tx, frames_rx) = mpsc::unbounded_channel();
                let (sent_tx, sent_rx) = mpsc::unbounded_channel();
                let guard = LiveGuard::new(Arc::clone(&self.live), &self.max_live);
                let _ = self.servers_tx.send(ServerEnd {
                    frames: frames_tx,
                    sent: sent_rx,
                });
                Ok(Box::new(ScriptedLink {
                    frames: frames_rx,
                    sent: sent_tx,
                    guard: Some(guard),
                }))
            }
        }
    }
}

struct LiveGuard {
    live: Arc<AtomicUsize>,
}

impl LiveGuard {
    fn new(live: Arc<AtomicUsize>, max_live: &AtomicUsize) -> Self {
        let now = live.fetch_add(1, Ordering::SeqCst) + 1;
        max_live.fetch_max(now, Ordering::SeqCst);
        Self { live }
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

struct ScriptedLink {
    frames: mpsc::UnboundedReceiver<Result<String>>,
    sent: mpsc::UnboundedSender<OutboundFrame>,
    guard: Option<LiveGuard>,
}

#[async_trait]
impl Link for ScriptedLink {
    async fn recv(&mut self) -> Option<Result<InboundFrame>> {
        if self.guard.is_none() {
            return None;
        }
        let text = self.frames.recv().await?;
        Some(text.and_then(|t| InboundFrame::parse(&t)))
    }

    async fn send(&mut self, frame: &OutboundFrame) -> Result<()> {
        if self.guard.is_none() {
            return Err(SocioHubError::Transport("link closed".into()));
        }
        self.sent
            .send(frame.clone())
            .map_err(|_| SocioHubError::Transport("server gone".into()))
    }

    async fn close(&mut self) {
        self.guard = None;
    }
}

pub fn app_state() -> AppState {
    let cfg = config::load_from_str(
        r#"
version: 1
realtime:
  url: "ws://127.0.0.1:9/realtime"
  base_delay_ms: 1000
  max_retries: 3
"#,
    )
    .expect("config");
    AppState::new(cfg).expect("app state")
}

pub struct Harness {
    pub state: AppState,
    pub transport: Arc<ScriptedTransport>,
    pub session: SessionManager,
    pub status: watch::Receiver<SessionStatus>,
    pub updates: mpsc::UnboundedReceiver<StateUpdate>,
}

impl Harness {
    pub fn start(transport: ScriptedTransport) -> Self {
        let state = app_state();
        let transport = Arc::new(transport);
        let (tx, updates) = mpsc::unbounded_channel();
        let session = state.start_session(transport.clone(), Arc::new(tx));
        let status = session.subscribe_status();
        Self {
            state,
            transport,
            session,
            status,
            updates,
        }
    }

    pub fn accepting() -> Self {
        Self::start(ScriptedTransport::new(Vec::new(), Outcome::Accept))
    }

    pub fn login(&self, token: &str) {
        self.session.set_token(Some(token.to_string()));
    }

    pub async fn wait_for(&mut self, pred: impl FnMut(&SessionStatus) -> bool) -> SessionStatus {
        let status = tokio::time::timeout(Duration::from_secs(60), self.status.wait_for(pred))
            .await
            .expect("timed out waiting for status")
            .expect("session driver gone");
        (*status).clone()
    }

    pub async fn wait_connected(&mut self) {
        self.wait_for(SessionStatus::is_connected).await;
    }

    pub async fn next_update(&mut self) -> StateUpdate {
        tokio::time::timeout(Duration::from_secs(30), self.updates.recv())
            .await
            .expect("timed out waiting for state update")
            .expect("sink dropped")
    }
}

/// `at` lies within a few ms after `start + expected` (timer granularity).
pub fn assert_offset(start: Instant, at: Instant, expected: Duration) {
    let offset = at - start;
    assert!(
        offset >= expected && offset < expected + Duration::from_millis(5),
        "offset {offset:?}, expected {expected:?}"
    );
}
