use sociohub_core::error::{Result, SocioHubError};
use sociohub_core::protocol::events::{inbound, PeerRef, PresenceSnapshot};
use sociohub_core::protocol::InboundFrame;

use crate::dispatch::EventHandler;
use crate::state::StateUpdate;

/// Online/offline status of chat partners.
#[derive(Default)]
pub struct PresenceHandler;

impl EventHandler for PresenceHandler {
    fn events(&self) -> &'static [&'static str] {
        &[
            inbound::CHAT_PARTNERS_STATUS,
            inbound::USER_ONLINE,
            inbound::USER_OFFLINE,
        ]
    }

    fn handle(&self, frame: &InboundFrame) -> Result<StateUpdate> {
        match frame.event.as_str() {
            inbound::CHAT_PARTNERS_STATUS => {
                let snap: PresenceSnapshot = frame.data_as()?;
                Ok(StateUpdate::PresenceSnapshot(snap.peers))
            }
            inbound::USER_ONLINE => {
                let p: PeerRef = frame.data_as()?;
                Ok(StateUpdate::PeerOnline(p.user_id))
            }
            inbound::USER_OFFLINE => {
                let p: PeerRef = frame.data_as()?;
                Ok(StateUpdate::PeerOffline(p.user_id))
            }
            other => Err(SocioHubError::BadRequest(format!(
                "presence cannot handle {other}"
            ))),
        }
    }
}
