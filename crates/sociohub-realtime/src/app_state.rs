//! Shared application state for the realtime client.
//!
//! Wires config, the event dispatcher (with built-in handlers) and metrics, and
//! starts sessions on top of them.

use std::sync::Arc;

use sociohub_core::deeplink::{self, DeepLink};
use sociohub_core::error::{Result, SocioHubError};
use sociohub_core::protocol::events::inbound;

use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::handlers;
use crate::obs::SessionMetrics;
use crate::session::{RetryPolicy, SessionManager};
use crate::state::StateSink;
use crate::transport::{Transport, WsTransport};

/// Events every client must understand.
const REQUIRED_EVENTS: [&str; 9] = [
    inbound::NOTIFICATION_COUNT,
    inbound::NEW_NOTIFICATION,
    inbound::NEW_MESSAGE,
    inbound::DELETE_MESSAGE,
    inbound::CHAT_PARTNERS_STATUS,
    inbound::USER_ONLINE,
    inbound::USER_OFFLINE,
    inbound::TYPING,
    inbound::STOP_TYPING,
];

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<SessionMetrics>,
}

struct AppStateInner {
    cfg: ClientConfig,
}

impl AppState {
    /// Build application state with the built-in handlers registered.
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let dispatcher = Dispatcher::new();
        handlers::register_builtin(&dispatcher);
        Self::with_dispatcher(cfg, dispatcher)
    }

    /// Build from a caller-assembled dispatcher (extra or replacement handlers).
    pub fn with_dispatcher(cfg: ClientConfig, dispatcher: Dispatcher) -> Result<Self> {
        cfg.validate()?;

        let registered = dispatcher.registered_events();
        for ev in REQUIRED_EVENTS {
            if !registered.contains(&ev) {
                return Err(SocioHubError::BadRequest(format!(
                    "no handler registered for required event: {ev}"
                )));
            }
        }

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            dispatcher: Arc::new(dispatcher),
            metrics: Arc::new(SessionMetrics::new()),
        })
    }

    pub fn cfg(&self) -> &ClientConfig {
        &self.inner.cfg
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn metrics(&self) -> Arc<SessionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.inner.cfg.realtime)
    }

    pub fn ws_transport(&self) -> Result<WsTransport> {
        WsTransport::new(&self.inner.cfg.realtime)
    }

    /// Start a session over `transport`, feeding state updates to `sink`.
    pub fn start_session(
        &self,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn StateSink>,
    ) -> SessionManager {
        SessionManager::spawn(
            transport,
            self.dispatcher(),
            sink,
            self.retry_policy(),
            self.metrics(),
        )
    }

    /// Interpret an incoming deep link with the configured canonical host.
    pub fn interpret_link(&self, raw: &str) -> DeepLink {
        deeplink::interpret(raw, &self.inner.cfg.deep_link.canonical_host)
    }
}
