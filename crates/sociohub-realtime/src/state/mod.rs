//! Application state fed by the realtime connection.
//!
//! Handlers translate inbound events into [`StateUpdate`]s and hand them to a
//! [`StateSink`]. The sink is injected, so UI shells can plug in their own
//! store; [`RealtimeStore`] is the in-memory default.

mod store;

use sociohub_core::protocol::events::{ChatMessage, Notification, PeerStatus};
use tokio::sync::mpsc;

pub use store::RealtimeStore;

/// One state mutation derived from a server event.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    UnreadCount(u64),
    NotificationReceived(Notification),
    MessageReceived(ChatMessage),
    MessageDeleted { chat_id: String, message_id: String },
    /// Replaces the whole online set.
    PresenceSnapshot(Vec<PeerStatus>),
    PeerOnline(String),
    PeerOffline(String),
    TypingStarted { chat_id: String, user_id: String },
    TypingStopped { chat_id: String, user_id: String },
}

/// Receiver of state updates. Must not block: it runs on the session task.
pub trait StateSink: Send + Sync {
    fn apply(&self, update: StateUpdate);
}

/// Forward updates to a channel (UI event loops, tests).
impl StateSink for mpsc::UnboundedSender<StateUpdate> {
    fn apply(&self, update: StateUpdate) {
        let _ = self.send(update);
    }
}
