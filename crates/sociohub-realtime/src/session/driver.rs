//! Session driver: the single task that owns the connection.
//!
//! Wakes on token changes, commands from the handle, inbound frames and the
//! retry timer. All failures end up as status transitions; nothing escapes.

use std::future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use sociohub_core::error::{Result, SocioHubError};
use sociohub_core::protocol::events;
use sociohub_core::protocol::{InboundFrame, OutboundFrame};

use crate::dispatch::Dispatcher;
use crate::obs::SessionMetrics;
use crate::session::retry::{RetryPolicy, RetryState};
use crate::session::status::SessionStatus;
use crate::session::subscriptions::SubscriptionSet;
use crate::state::StateSink;
use crate::transport::{Link, Transport};

#[derive(Debug)]
pub(crate) enum Command {
    Emit(OutboundFrame),
    Shutdown,
}

enum Wake {
    Token,
    Command(Command),
    Frame(Option<Result<InboundFrame>>),
    Retry,
    Closed,
}

pub(crate) struct Driver {
    transport: Arc<dyn Transport>,
    dispatcher: Arc<Dispatcher>,
    sink: Arc<dyn StateSink>,
    metrics: Arc<SessionMetrics>,

    token_rx: watch::Receiver<Option<String>>,
    cmd_rx: mpsc::Receiver<Command>,
    status_tx: watch::Sender<SessionStatus>,

    token: Option<String>,
    link: Option<Box<dyn Link>>,
    subs: SubscriptionSet,
    retry: RetryState,
    /// The server rejected `token`; stays set until the token changes.
    auth_failed: bool,
    /// Shutdown arrived while a handshake was in flight.
    stopping: bool,
}

impl Driver {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        dispatcher: Arc<Dispatcher>,
        sink: Arc<dyn StateSink>,
        metrics: Arc<SessionMetrics>,
        policy: RetryPolicy,
        token_rx: watch::Receiver<Option<String>>,
        cmd_rx: mpsc::Receiver<Command>,
        status_tx: watch::Sender<SessionStatus>,
    ) -> Self {
        let subs = SubscriptionSet::new(dispatcher.registered_events());
        Self {
            transport,
            dispatcher,
            sink,
            metrics,
            token_rx,
            cmd_rx,
            status_tx,
            token: None,
            link: None,
            subs,
            retry: RetryState::new(policy),
            auth_failed: false,
            stopping: false,
        }
    }

    pub(crate) async fn run(mut self) {
        let initial = self.token_rx.borrow_and_update().clone();
        self.apply_token(initial).await;

        while !self.stopping {
            let wake = tokio::select! {
                changed = self.token_rx.changed() => match changed {
                    Ok(()) => Wake::Token,
                    Err(_) => Wake::Closed,
                },
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => Wake::Command(cmd),
                    None => Wake::Closed,
                },
                frame = next_frame(&mut self.link) => Wake::Frame(frame),
                () = self.retry.fired() => Wake::Retry,
            };

            match wake {
                Wake::Token => {
                    let token = self.token_rx.borrow_and_update().clone();
                    self.apply_token(token).await;
                }
                Wake::Command(Command::Emit(frame)) => self.emit(frame).await,
                Wake::Command(Command::Shutdown) | Wake::Closed => break,
                Wake::Frame(Some(Ok(frame))) => self.on_frame(&frame),
                Wake::Frame(Some(Err(e))) => self.on_link_error(e).await,
                Wake::Frame(None) => self.on_link_lost("closed by server").await,
                Wake::Retry => self.on_retry().await,
            }
        }

        self.retry.cancel();
        self.disconnect().await;
        self.set_status(SessionStatus::Idle);
        tracing::debug!("session driver stopped");
    }

    /// React to a new desired token. Same value is a no-op.
    async fn apply_token(&mut self, token: Option<String>) {
        if token == self.token {
            return;
        }

        self.disconnect().await;
        self.retry.reset();
        self.auth_failed = false;
        self.token = token;

        match self.token.clone() {
            Some(t) => self.connect(&t).await,
            None => self.set_status(SessionStatus::Idle),
        }
    }

    async fn connect(&mut self, token: &str) {
        // At most one live connection: drop whatever is there first.
        self.disconnect().await;
        self.retry.cancel();
        self.set_status(SessionStatus::Connecting);

        let Some(result) = self.race_connect(token).await else {
            self.metrics.connect_attempts.inc(&[("outcome", "cancelled")]);
            tracing::debug!("realtime connect abandoned");
            return;
        };

        match result {
            Ok(link) => {
                self.metrics.connect_attempts.inc(&[("outcome", "ok")]);
                self.retry.reset();
                self.link = Some(link);
                let n = self.subs.attach();
                self.set_status(SessionStatus::Connected);
                tracing::info!(subscriptions = n, "realtime connected");

                // Reconcile whatever changed while we were away.
                for frame in [
                    events::get_notification_count(),
                    events::get_chat_partners_status(),
                ] {
                    self.emit(frame).await;
                }
            }
            Err(e) if e.is_auth() => {
                self.metrics.connect_attempts.inc(&[("outcome", "auth")]);
                self.on_auth_failure().await;
            }
            Err(e) => {
                self.metrics.connect_attempts.inc(&[("outcome", "error")]);
                tracing::debug!(error = %e, "realtime connect failed");
                self.schedule_retry();
            }
        }
    }

    /// Run the handshake while still listening to the handle.
    ///
    /// Returns `None` when a token change or shutdown overtook the handshake;
    /// the in-flight attempt is dropped and the new token is left flagged for
    /// the main loop.
    async fn race_connect(&mut self, token: &str) -> Option<Result<Box<dyn Link>>> {
        let transport = Arc::clone(&self.transport);
        let attempt = transport.connect(token);
        tokio::pin!(attempt);

        loop {
            tokio::select! {
                res = &mut attempt => return Some(res),
                changed = self.token_rx.changed() => {
                    if changed.is_err() {
                        self.stopping = true;
                        return None;
                    }
                    if self.token_rx.borrow().as_deref() != Some(token) {
                        self.token_rx.mark_changed();
                        return None;
                    }
                }
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Emit(frame)) => self.drop_emit(&frame),
                    Some(Command::Shutdown) | None => {
                        self.stopping = true;
                        return None;
                    }
                },
            }
        }
    }

    /// Detach subscriptions, close the transport, clear the handle.
    /// No-op without a connection.
    async fn disconnect(&mut self) {
        self.subs.detach();
        if let Some(link) = self.link.as_mut() {
            link.close().await;
            tracing::info!("realtime disconnected");
        }
        self.link = None;
    }

    async fn on_auth_failure(&mut self) {
        self.auth_failed = true;
        self.retry.cancel();
        self.disconnect().await;
        self.set_status(SessionStatus::AuthFailed);
        tracing::warn!("realtime token rejected; please log in again");
    }

    fn schedule_retry(&mut self) {
        if self.auth_failed || self.token.is_none() {
            return;
        }
        match self.retry.schedule() {
            Some((attempt, delay)) => {
                self.metrics.retries_scheduled.inc(&[]);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "realtime retry scheduled");
                self.set_status(SessionStatus::Disconnected {
                    attempt,
                    retry_in: delay,
                });
            }
            None => {
                tracing::warn!(retries = self.retry.count(), "realtime retries exhausted");
                self.set_status(SessionStatus::Exhausted);
            }
        }
    }

    async fn on_retry(&mut self) {
        if self.auth_failed || self.link.is_some() {
            return;
        }
        if let Some(token) = self.token.clone() {
            self.connect(&token).await;
        }
    }

    fn on_frame(&self, frame: &InboundFrame) {
        let ev = frame.event.as_str();
        if !self.subs.is_attached(ev) {
            self.metrics.frames_dropped.inc(&[("reason", "unsubscribed")]);
            tracing::debug!(event = %ev, "dropping frame for unsubscribed event");
            return;
        }
        match self.dispatcher.dispatch(frame, self.sink.as_ref()) {
            Ok(()) => self.metrics.frames_dispatched.inc(&[("event", ev)]),
            Err(e) => {
                self.metrics.frames_dropped.inc(&[("reason", "malformed")]);
                tracing::debug!(event = %ev, error = %e, "dropping malformed payload");
            }
        }
    }

    async fn on_link_error(&mut self, e: SocioHubError) {
        match e {
            SocioHubError::AuthFailed => self.on_auth_failure().await,
            SocioHubError::BadRequest(msg) => {
                self.metrics.frames_dropped.inc(&[("reason", "decode")]);
                tracing::debug!(error = %msg, "dropping undecodable frame");
            }
            other => self.on_link_lost(&other.to_string()).await,
        }
    }

    async fn on_link_lost(&mut self, reason: &str) {
        tracing::warn!(reason, "realtime connection lost");
        self.disconnect().await;
        self.schedule_retry();
    }

    async fn emit(&mut self, frame: OutboundFrame) {
        let Some(link) = self.link.as_mut() else {
            self.drop_emit(&frame);
            return;
        };
        if let Err(e) = link.send(&frame).await {
            self.metrics.emits_dropped.inc(&[("event", frame.event.as_str())]);
            self.on_link_lost(&e.to_string()).await;
        }
    }

    fn drop_emit(&self, frame: &OutboundFrame) {
        self.metrics.emits_dropped.inc(&[("event", frame.event.as_str())]);
        tracing::debug!(event = %frame.event, "not connected; dropping emit");
    }

    fn set_status(&self, status: SessionStatus) {
        self.status_tx.send_if_modified(|cur| {
            if *cur == status {
                false
            } else {
                *cur = status;
                true
            }
        });
    }
}

async fn next_frame(link: &mut Option<Box<dyn Link>>) -> Option<Result<InboundFrame>> {
    match link {
        Some(link) => link.recv().await,
        None => future::pending().await,
    }
}
