use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use sociohub_core::error::{Result, SocioHubError};
use sociohub_core::protocol::events;
use sociohub_core::protocol::OutboundFrame;

use crate::dispatch::Dispatcher;
use crate::obs::SessionMetrics;
use crate::session::driver::{Command, Driver};
use crate::session::retry::RetryPolicy;
use crate::session::status::SessionStatus;
use crate::state::StateSink;
use crate::transport::Transport;

const COMMAND_QUEUE: usize = 256;

/// Handle to one realtime session.
///
/// The connection itself lives in a driver task; this handle only feeds it the
/// current token and outbound events, and exposes the resulting status.
/// Dropping the handle stops the driver and closes the connection.
pub struct SessionManager {
    token_tx: watch::Sender<Option<String>>,
    cmd_tx: mpsc::Sender<Command>,
    status_rx: watch::Receiver<SessionStatus>,
    metrics: Arc<SessionMetrics>,
    task: JoinHandle<()>,
}

impl SessionManager {
    /// Spawn the driver on the current tokio runtime. Starts `Idle`.
    pub fn spawn(
        transport: Arc<dyn Transport>,
        dispatcher: Arc<Dispatcher>,
        sink: Arc<dyn StateSink>,
        policy: RetryPolicy,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        let (token_tx, token_rx) = watch::channel(None);
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE);
        let (status_tx, status_rx) = watch::channel(SessionStatus::Idle);

        let driver = Driver::new(
            transport,
            dispatcher,
            sink,
            Arc::clone(&metrics),
            policy,
            token_rx,
            cmd_rx,
            status_tx,
        );
        let task = tokio::spawn(driver.run());

        Self {
            token_tx,
            cmd_tx,
            status_rx,
            metrics,
            task,
        }
    }

    /// Set (login/refresh) or clear (logout) the session token.
    /// Re-setting the current value does nothing.
    pub fn set_token(&self, token: Option<String>) {
        self.token_tx.send_if_modified(|cur| {
            if *cur == token {
                false
            } else {
                *cur = token;
                true
            }
        });
    }

    /// End the session: tear down the connection and forget the token.
    /// Idempotent.
    pub fn disconnect(&self) {
        self.set_token(None);
    }

    pub fn status(&self) -> SessionStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }

    pub fn metrics(&self) -> Arc<SessionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Queue an outbound event. It is dropped if no connection is live when
    /// the driver gets to it.
    pub fn emit(&self, frame: OutboundFrame) -> Result<()> {
        self.cmd_tx.try_send(Command::Emit(frame)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                SocioHubError::Internal("session command queue full".into())
            }
            mpsc::error::TrySendError::Closed(_) => SocioHubError::NotConnected,
        })
    }

    pub fn mark_notification_read(&self, notification_id: &str) -> Result<()> {
        self.emit(events::mark_notification_read(notification_id))
    }

    /// Stop the driver and wait for it to close the connection.
    pub async fn shutdown(self) {
        let _ = self.cmd_tx.send(Command::Shutdown).await;
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "session driver task failed");
        }
    }
}
