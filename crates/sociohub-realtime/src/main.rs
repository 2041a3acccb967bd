//! Headless SocioHub realtime client.
//!
//! - Config: `SOCIOHUB_CONFIG` (default `sociohub.yaml`)
//! - Token: `SOCIOHUB_TOKEN`
//! - Optional `SOCIOHUB_LINK`: interpret a deep link and log the result
//! - Logs status transitions until Ctrl+C / SIGTERM

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use sociohub_core::error::Result;
use sociohub_realtime::{app_state::AppState, config, state::RealtimeStore};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::var("SOCIOHUB_CONFIG").unwrap_or_else(|_| "sociohub.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let state = AppState::new(cfg)?;

    if let Ok(raw) = std::env::var("SOCIOHUB_LINK") {
        let link = state.interpret_link(&raw);
        tracing::info!(route = link.route.as_str(), params = ?link.params, "deep link");
    }

    let transport = Arc::new(state.ws_transport()?);
    let store = Arc::new(RealtimeStore::new());
    let session = state.start_session(transport, store.clone());

    let mut status = session.subscribe_status();
    let token = std::env::var("SOCIOHUB_TOKEN").ok().filter(|t| !t.is_empty());
    if token.is_none() {
        tracing::warn!("SOCIOHUB_TOKEN not set; staying idle");
    }
    session.set_token(token);

    tracing::info!(url = %state.cfg().realtime.url, "sociohub-realtime starting");

    tokio::select! {
        _ = shutdown_signal() => {}
        _ = async {
            while status.changed().await.is_ok() {
                let s = status.borrow_and_update().clone();
                tracing::info!(status = s.as_str(), "session status");
                if s.needs_login() {
                    tracing::warn!("token rejected; log in again and restart with a fresh SOCIOHUB_TOKEN");
                }
            }
        } => {}
    }

    tracing::info!(
        unread = store.unread_count(),
        online = store.online_peers().len(),
        "shutting down"
    );
    let metrics = session.metrics();
    session.shutdown().await;
    tracing::info!("final metrics:\n{}", metrics.render());
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, shutting down");
}
