#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod support;

use std::time::Duration;

use tokio::time::Instant;

use sociohub_realtime::session::SessionStatus;
use support::{Harness, Outcome, ScriptedTransport};

#[tokio::test(start_paused = true)]
async fn connect_sends_pull_requests() {
    let mut h = Harness::accepting();
    assert_eq!(h.session.status(), SessionStatus::Idle);

    h.login("t1");
    h.wait_connected().await;

    let mut server = h.transport.next_server().await;
    let first = server.next_sent().await.unwrap();
    let second = server.next_sent().await.unwrap();
    assert_eq!(first.event, "get-notification-count");
    assert_eq!(second.event, "get-chat-partners-status");

    let attempts = h.transport.attempts();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].token, "t1");
    assert_eq!(h.session.metrics().connect_attempts.get(&[("outcome", "ok")]), 1);
}

#[tokio::test(start_paused = true)]
async fn token_rotation_never_overlaps() {
    let mut h = Harness::accepting();

    h.login("a");
    h.wait_connected().await;
    let mut server_a = h.transport.next_server().await;

    h.login("b");
    let _server_b = h.transport.next_server().await;
    h.wait_connected().await;

    assert_eq!(h.transport.max_live(), 1);
    assert_eq!(h.transport.live(), 1);

    // The old connection is gone once its buffered frames are drained.
    assert!(server_a.next_sent().await.is_some());
    assert!(server_a.next_sent().await.is_some());
    assert!(server_a.next_sent().await.is_none());

    let tokens: Vec<_> = h.transport.attempts().into_iter().map(|a| a.token).collect();
    assert_eq!(tokens, vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn same_token_is_a_noop() {
    let mut h = Harness::accepting();

    h.login("a");
    h.wait_connected().await;
    h.login("a");
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(h.transport.attempts().len(), 1);
    assert_eq!(h.transport.live(), 1);
    assert!(h.session.status().is_connected());
}

#[tokio::test(start_paused = true)]
async fn logout_disconnects_and_goes_idle() {
    let mut h = Harness::accepting();

    h.login("a");
    h.wait_connected().await;
    let mut server = h.transport.next_server().await;

    h.session.set_token(None);
    h.wait_for(|s| *s == SessionStatus::Idle).await;
    assert_eq!(h.transport.live(), 0);

    server.next_sent().await.unwrap();
    server.next_sent().await.unwrap();
    assert!(server.next_sent().await.is_none());

    // Nothing revives the session without a token.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.transport.attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn disconnect_is_idempotent() {
    let mut h = Harness::accepting();

    h.session.disconnect();
    h.session.disconnect();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.session.status(), SessionStatus::Idle);
    assert!(h.transport.attempts().is_empty());

    h.login("a");
    h.wait_connected().await;
    h.session.disconnect();
    h.session.disconnect();
    h.wait_for(|s| *s == SessionStatus::Idle).await;
    assert_eq!(h.transport.live(), 0);
    assert_eq!(h.transport.attempts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_closes_the_connection() {
    let mut h = Harness::accepting();

    h.login("a");
    h.wait_connected().await;
    assert_eq!(h.transport.live(), 1);

    let transport = h.transport.clone();
    h.session.shutdown().await;
    assert_eq!(transport.live(), 0);
}

fn slow_transport() -> ScriptedTransport {
    ScriptedTransport::new(Vec::new(), Outcome::Accept).with_delay(Duration::from_secs(10))
}

#[tokio::test(start_paused = true)]
async fn logout_interrupts_connect_in_flight() {
    let mut h = Harness::start(slow_transport());

    h.login("a");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.session.status(), SessionStatus::Connecting);

    let logout_at = Instant::now();
    h.session.set_token(None);
    h.wait_for(|s| *s == SessionStatus::Idle).await;
    assert!(Instant::now() - logout_at < Duration::from_millis(100));

    // The abandoned handshake never yields a link or pull requests.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.transport.accepted(), 0);
    assert_eq!(h.transport.max_live(), 0);
    assert_eq!(h.transport.attempts().len(), 1);
    assert_eq!(h.session.status(), SessionStatus::Idle);
    assert_eq!(
        h.session.metrics().connect_attempts.get(&[("outcome", "cancelled")]),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn rotation_during_connect_uses_only_the_new_token() {
    let mut h = Harness::start(slow_transport());

    h.login("a");
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.login("b");
    h.wait_connected().await;

    let mut server = h.transport.next_server().await;
    assert_eq!(server.next_sent().await.unwrap().event, "get-notification-count");

    let tokens: Vec<_> = h.transport.attempts().into_iter().map(|a| a.token).collect();
    assert_eq!(tokens, vec!["a", "b"]);
    assert_eq!(h.transport.accepted(), 1);
    assert_eq!(h.transport.max_live(), 1);
}

#[tokio::test(start_paused = true)]
async fn emit_during_connect_is_dropped() {
    let mut h = Harness::start(slow_transport());

    h.login("a");
    tokio::time::sleep(Duration::from_secs(1)).await;
    h.session.mark_notification_read("n1").unwrap();
    h.wait_connected().await;

    let metrics = h.session.metrics();
    assert_eq!(metrics.emits_dropped.get(&[("event", "mark-notification-read")]), 1);

    let mut server = h.transport.next_server().await;
    assert_eq!(server.next_sent().await.unwrap().event, "get-notification-count");
    assert_eq!(server.next_sent().await.unwrap().event, "get-chat-partners-status");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(server.sent.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_connect_in_flight() {
    let h = Harness::start(slow_transport());

    h.login("a");
    tokio::time::sleep(Duration::from_secs(1)).await;

    let transport = h.transport.clone();
    tokio::time::timeout(Duration::from_millis(100), h.session.shutdown())
        .await
        .expect("shutdown waited for the handshake");
    assert_eq!(transport.accepted(), 0);
    assert_eq!(transport.live(), 0);
}
