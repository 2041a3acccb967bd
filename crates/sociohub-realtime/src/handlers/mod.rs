//! Built-in event handlers.
//!
//! Each handler owns a group of related server events and turns their payloads
//! into [`StateUpdate`](crate::state::StateUpdate)s.

mod chat;
mod notifications;
mod presence;

use std::sync::Arc;

use crate::dispatch::Dispatcher;

pub use chat::ChatHandler;
pub use notifications::NotificationHandler;
pub use presence::PresenceHandler;

pub fn register_builtin(dispatcher: &Dispatcher) {
    dispatcher.register(Arc::new(NotificationHandler));
    dispatcher.register(Arc::new(ChatHandler));
    dispatcher.register(Arc::new(PresenceHandler));
}
