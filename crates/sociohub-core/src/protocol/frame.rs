//! Event envelope (JSON).
//!
//! Inbound `data` is kept as `RawValue` so only the handler that owns the
//! event pays for deserializing it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{Result, SocioHubError};

/// Server -> client frame.
#[derive(Debug, Deserialize)]
pub struct InboundFrame {
    /// Event name (e.g. "new-message").
    pub event: String,
    /// Optional payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

impl InboundFrame {
    pub fn parse(s: &str) -> Result<Self> {
        serde_json::from_str(s)
            .map_err(|e| SocioHubError::BadRequest(format!("invalid frame json: {e}")))
    }

    pub fn parse_slice(b: &[u8]) -> Result<Self> {
        serde_json::from_slice(b)
            .map_err(|e| SocioHubError::BadRequest(format!("invalid frame json: {e}")))
    }

    /// Deserialize `data` into the payload type the event carries.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = self
            .data
            .as_ref()
            .ok_or_else(|| SocioHubError::BadRequest(format!("{} requires data", self.event)))?;
        serde_json::from_str(raw.get())
            .map_err(|e| SocioHubError::BadRequest(format!("{} invalid data: {e}", self.event)))
    }
}

/// Client -> server frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundFrame {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OutboundFrame {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SocioHubError::Internal(format!("json encode failed: {e}")))
    }
}
