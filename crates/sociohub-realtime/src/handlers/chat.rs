use sociohub_core::error::{Result, SocioHubError};
use sociohub_core::protocol::events::{inbound, ChatMessage, DeletedMessage, TypingEvent};
use sociohub_core::protocol::InboundFrame;

use crate::dispatch::EventHandler;
use crate::state::StateUpdate;

#[derive(Default)]
pub struct ChatHandler;

impl EventHandler for ChatHandler {
    fn events(&self) -> &'static [&'static str] {
        &[
            inbound::NEW_MESSAGE,
            inbound::DELETE_MESSAGE,
            inbound::TYPING,
            inbound::STOP_TYPING,
        ]
    }

    fn handle(&self, frame: &InboundFrame) -> Result<StateUpdate> {
        match frame.event.as_str() {
            inbound::NEW_MESSAGE => {
                let m: ChatMessage = frame.data_as()?;
                Ok(StateUpdate::MessageReceived(m))
            }
            inbound::DELETE_MESSAGE => {
                let d: DeletedMessage = frame.data_as()?;
                Ok(StateUpdate::MessageDeleted {
                    chat_id: d.chat_id,
                    message_id: d.message_id,
                })
            }
            inbound::TYPING => {
                let t: TypingEvent = frame.data_as()?;
                Ok(StateUpdate::TypingStarted {
                    chat_id: t.chat_id,
                    user_id: t.user_id,
                })
            }
            inbound::STOP_TYPING => {
                let t: TypingEvent = frame.data_as()?;
                Ok(StateUpdate::TypingStopped {
                    chat_id: t.chat_id,
                    user_id: t.user_id,
                })
            }
            other => Err(SocioHubError::BadRequest(format!("chat cannot handle {other}"))),
        }
    }
}
