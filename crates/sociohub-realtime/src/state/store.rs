use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use dashmap::{DashMap, DashSet};

use sociohub_core::protocol::events::{ChatMessage, Notification};

use super::{StateSink, StateUpdate};

/// In-memory realtime state: unread count, notifications, chat messages,
/// online peers and typing indicators.
#[derive(Default)]
pub struct RealtimeStore {
    unread: AtomicU64,
    notifications: Mutex<Vec<Notification>>,
    /// chat_id -> messages in arrival order
    messages: DashMap<String, Vec<ChatMessage>>,
    online: DashSet<String>,
    /// chat_id -> users currently typing
    typing: DashMap<String, DashSet<String>>,
}

impl RealtimeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unread_count(&self) -> u64 {
        self.unread.load(Ordering::Relaxed)
    }

    /// Newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        match self.notifications.lock() {
            Ok(g) => g.iter().rev().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn messages(&self, chat_id: &str) -> Vec<ChatMessage> {
        self.messages
            .get(chat_id)
            .map(|m| m.value().clone())
            .unwrap_or_default()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.online.contains(user_id)
    }

    pub fn online_peers(&self) -> Vec<String> {
        let mut v: Vec<String> = self.online.iter().map(|u| u.key().clone()).collect();
        v.sort();
        v
    }

    pub fn typing_in(&self, chat_id: &str) -> Vec<String> {
        let mut v: Vec<String> = self
            .typing
            .get(chat_id)
            .map(|set| set.iter().map(|u| u.key().clone()).collect())
            .unwrap_or_default();
        v.sort();
        v
    }

    fn add_notification(&self, n: Notification) {
        // Poisoned mutex means a logic bug elsewhere; skip instead of panicking.
        let Ok(mut g) = self.notifications.lock() else {
            return;
        };
        if g.iter().any(|existing| existing.id == n.id) {
            return;
        }
        if !n.read {
            self.unread.fetch_add(1, Ordering::Relaxed);
        }
        g.push(n);
    }

    fn add_message(&self, m: ChatMessage) {
        let mut chat = self.messages.entry(m.chat_id.clone()).or_default();
        if chat.iter().any(|existing| existing.id == m.id) {
            return;
        }
        chat.push(m);
    }

    fn delete_message(&self, chat_id: &str, message_id: &str) {
        if let Some(mut chat) = self.messages.get_mut(chat_id) {
            chat.retain(|m| m.id != message_id);
        }
    }

    fn typing_start(&self, chat_id: &str, user_id: &str) {
        self.typing
            .entry(chat_id.to_string())
            .or_insert_with(DashSet::new)
            .insert(user_id.to_string());
    }

    fn typing_stop(&self, chat_id: &str, user_id: &str) {
        if let Some(set) = self.typing.get(chat_id) {
            set.remove(user_id);
            if set.is_empty() {
                drop(set);
                self.typing.remove(chat_id);
            }
        }
    }

    fn peer_offline(&self, user_id: &str) {
        self.online.remove(user_id);
        // An offline peer cannot still be typing anywhere.
        self.typing.retain(|_, set| {
            set.remove(user_id);
            !set.is_empty()
        });
    }
}

impl StateSink for RealtimeStore {
    fn apply(&self, update: StateUpdate) {
        match update {
            StateUpdate::UnreadCount(n) => self.unread.store(n, Ordering::Relaxed),
            StateUpdate::NotificationReceived(n) => self.add_notification(n),
            StateUpdate::MessageReceived(m) => {
                // A message ends the sender's typing indicator.
                if let Some(sender) = m.sender_id.as_deref() {
                    self.typing_stop(&m.chat_id, sender);
                }
                self.add_message(m);
            }
            StateUpdate::MessageDeleted { chat_id, message_id } => {
                self.delete_message(&chat_id, &message_id)
            }
            StateUpdate::PresenceSnapshot(peers) => {
                self.online.clear();
                for p in peers.into_iter().filter(|p| p.is_online) {
                    self.online.insert(p.user_id);
                }
            }
            StateUpdate::PeerOnline(u) => {
                self.online.insert(u);
            }
            StateUpdate::PeerOffline(u) => self.peer_offline(&u),
            StateUpdate::TypingStarted { chat_id, user_id } => self.typing_start(&chat_id, &user_id),
            StateUpdate::TypingStopped { chat_id, user_id } => self.typing_stop(&chat_id, &user_id),
        }
    }
}
