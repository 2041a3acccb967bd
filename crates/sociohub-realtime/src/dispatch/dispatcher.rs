use std::sync::Arc;

use dashmap::DashMap;

use sociohub_core::error::{Result, SocioHubError};
use sociohub_core::protocol::InboundFrame;

use crate::state::{StateSink, StateUpdate};

/// Translates one or more inbound events into state updates.
///
/// Handlers only validate shape; they never perform I/O or hold state.
pub trait EventHandler: Send + Sync {
    fn events(&self) -> &'static [&'static str];
    fn handle(&self, frame: &InboundFrame) -> Result<StateUpdate>;
}

/// Registry and dispatcher keyed by inbound event name.
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<&'static str, Arc<dyn EventHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    pub fn register(&self, handler: Arc<dyn EventHandler>) {
        for ev in handler.events() {
            if self.handlers.insert(*ev, Arc::clone(&handler)).is_some() {
                tracing::warn!(event = %ev, "event handler replaced");
            }
        }
    }

    /// Event names with a registered handler, sorted.
    pub fn registered_events(&self) -> Vec<&'static str> {
        let mut v: Vec<&'static str> = self.handlers.iter().map(|e| *e.key()).collect();
        v.sort_unstable();
        v
    }

    pub fn dispatch(&self, frame: &InboundFrame, sink: &dyn StateSink) -> Result<()> {
        let ev = frame.event.as_str();
        let handler = self
            .handlers
            .get(ev)
            .ok_or_else(|| SocioHubError::BadRequest(format!("unknown event: {ev}")))?
            .value()
            .clone();
        let update = handler.handle(frame)?;
        sink.apply(update);
        Ok(())
    }
}
