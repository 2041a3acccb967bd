//! Inbound frame vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use sociohub_core::protocol::events::{ChatMessage, PresenceSnapshot};
use sociohub_core::protocol::InboundFrame;

use vector_loader::load_raw;

#[test]
fn parse_frame_min() {
    let f = InboundFrame::parse(&load_raw("frame_min.json")).unwrap();
    assert_eq!(f.event, "connect");
    assert!(f.data.is_none());
}

#[test]
fn parse_frame_message() {
    let f = InboundFrame::parse(&load_raw("frame_new_message.json")).unwrap();
    assert_eq!(f.event, "new-message");
    let m: ChatMessage = f.data_as().unwrap();
    assert_eq!(m.id, "m-100");
    assert_eq!(m.chat_id, "12");
    assert_eq!(m.sender_id.as_deref(), Some("u-7"));
    assert!(m.extra.contains_key("attachments"));
}

#[test]
fn parse_frame_presence_snapshot() {
    let f = InboundFrame::parse(&load_raw("frame_partners_status.json")).unwrap();
    let snap: PresenceSnapshot = f.data_as().unwrap();
    assert_eq!(snap.peers.len(), 3);
    assert_eq!(snap.online().collect::<Vec<_>>(), vec!["u-1", "u-3"]);
}

#[test]
fn frame_with_wrong_payload_shape_is_rejected_lazily() {
    let f = InboundFrame::parse(&load_raw("frame_bad_count.json")).unwrap();
    assert_eq!(f.event, "notification-count");
    let err = f
        .data_as::<sociohub_core::protocol::events::NotificationCount>()
        .unwrap_err();
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}
