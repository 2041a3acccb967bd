//! Event names and payload shapes.
//!
//! Ids arrive as strings from some backends and integers from others; both are
//! normalized to `String`. Unknown payload fields are kept in `extra` so the
//! UI can render them without this crate knowing about them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use super::frame::OutboundFrame;

/// Server -> client event names.
pub mod inbound {
    pub const CONNECT: &str = "connect";
    pub const CONNECT_ERROR: &str = "connect_error";

    pub const NOTIFICATION_COUNT: &str = "notification-count";
    pub const NEW_NOTIFICATION: &str = "new-notification";
    pub const NEW_MESSAGE: &str = "new-message";
    pub const DELETE_MESSAGE: &str = "delete-message";
    pub const CHAT_PARTNERS_STATUS: &str = "chat-partners-status";
    pub const USER_ONLINE: &str = "user-online";
    pub const USER_OFFLINE: &str = "user-offline";
    pub const TYPING: &str = "typing";
    pub const STOP_TYPING: &str = "stop-typing";
}

/// Client -> server event names.
pub mod outbound {
    pub const GET_NOTIFICATION_COUNT: &str = "get-notification-count";
    pub const GET_CHAT_PARTNERS_STATUS: &str = "get-chat-partners-status";
    pub const MARK_NOTIFICATION_READ: &str = "mark-notification-read";
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Str(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    RawId::deserialize(d).map(String::from)
}

fn de_opt_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(d).map(|id| id.map(String::from))
}

/// `notification-count`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NotificationCount {
    pub count: u64,
}

/// `new-notification`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `new-message`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub chat_id: String,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `delete-message`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMessage {
    #[serde(deserialize_with = "de_id")]
    pub message_id: String,
    #[serde(deserialize_with = "de_id")]
    pub chat_id: String,
}

/// `user-online` / `user-offline`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRef {
    #[serde(deserialize_with = "de_id")]
    pub user_id: String,
}

/// `typing` / `stop-typing`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingEvent {
    #[serde(deserialize_with = "de_id")]
    pub chat_id: String,
    #[serde(deserialize_with = "de_id")]
    pub user_id: String,
}

/// One peer's entry in a presence snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerStatus {
    #[serde(deserialize_with = "de_id")]
    pub user_id: String,
    #[serde(alias = "online")]
    pub is_online: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnapshot {
    List(Vec<PeerStatus>),
    Wrapped { statuses: Vec<PeerStatus> },
    Map(BTreeMap<String, bool>),
}

/// `chat-partners-status`: accepted as a list, `{statuses: [...]}`, or a
/// `userId -> online` map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct PresenceSnapshot {
    pub peers: Vec<PeerStatus>,
}

impl From<RawSnapshot> for PresenceSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        let peers = match raw {
            RawSnapshot::List(peers) | RawSnapshot::Wrapped { statuses: peers } => peers,
            RawSnapshot::Map(m) => m
                .into_iter()
                .map(|(user_id, is_online)| PeerStatus { user_id, is_online })
                .collect(),
        };
        Self { peers }
    }
}

impl PresenceSnapshot {
    pub fn online(&self) -> impl Iterator<Item = &str> {
        self.peers
            .iter()
            .filter(|p| p.is_online)
            .map(|p| p.user_id.as_str())
    }
}

/// `auth` also covers unauthorized / unauthenticated / authentication.
const AUTH_HINTS: [&str; 7] = [
    "auth",
    "forbidden",
    "invalid token",
    "token invalid",
    "expired token",
    "token expired",
    "jwt expired",
];

/// `connect_error` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectError {
    #[serde(default)]
    pub message: String,
}

impl ConnectError {
    /// The server reports a rejected credential with a message mentioning auth
    /// or a bad token. Other token wording (rate limiting) stays transient.
    pub fn is_auth(&self) -> bool {
        let m = self.message.to_ascii_lowercase();
        AUTH_HINTS.iter().any(|hint| m.contains(hint))
    }
}

pub fn get_notification_count() -> OutboundFrame {
    OutboundFrame::new(outbound::GET_NOTIFICATION_COUNT)
}

pub fn get_chat_partners_status() -> OutboundFrame {
    OutboundFrame::new(outbound::GET_CHAT_PARTNERS_STATUS)
}

pub fn mark_notification_read(notification_id: &str) -> OutboundFrame {
    OutboundFrame::new(outbound::MARK_NOTIFICATION_READ)
        .with_data(json!({ "notificationId": notification_id }))
}
