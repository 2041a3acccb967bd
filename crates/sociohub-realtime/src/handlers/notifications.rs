use sociohub_core::error::{Result, SocioHubError};
use sociohub_core::protocol::events::{inbound, Notification, NotificationCount};
use sociohub_core::protocol::InboundFrame;

use crate::dispatch::EventHandler;
use crate::state::StateUpdate;

#[derive(Default)]
pub struct NotificationHandler;

impl EventHandler for NotificationHandler {
    fn events(&self) -> &'static [&'static str] {
        &[inbound::NOTIFICATION_COUNT, inbound::NEW_NOTIFICATION]
    }

    fn handle(&self, frame: &InboundFrame) -> Result<StateUpdate> {
        match frame.event.as_str() {
            inbound::NOTIFICATION_COUNT => {
                let c: NotificationCount = frame.data_as()?;
                Ok(StateUpdate::UnreadCount(c.count))
            }
            inbound::NEW_NOTIFICATION => {
                let n: Notification = frame.data_as()?;
                Ok(StateUpdate::NotificationReceived(n))
            }
            other => Err(SocioHubError::BadRequest(format!(
                "notifications cannot handle {other}"
            ))),
        }
    }
}
