//! Decode-once codec between WebSocket messages and event frames.
//!
//! - Text frames => `InboundFrame` (lazy `RawValue` for data)
//! - Binary frames => `InboundFrame` when they carry UTF-8 JSON
//! - Ping/Pong are answered by tungstenite itself and surfaced as `Control`

use tokio_tungstenite::tungstenite::Message;

use sociohub_core::error::Result;
use sociohub_core::protocol::{InboundFrame, OutboundFrame};

#[derive(Debug)]
pub enum Inbound {
    Frame(InboundFrame),
    Control,
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => Ok(Inbound::Frame(InboundFrame::parse(s.as_str())?)),
        Message::Binary(b) => Ok(Inbound::Frame(InboundFrame::parse_slice(&b)?)),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Ok(Inbound::Control),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

pub fn encode(frame: &OutboundFrame) -> Result<Message> {
    Ok(Message::text(frame.to_json()?))
}
