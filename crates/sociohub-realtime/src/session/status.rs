use std::time::Duration;

/// Observable connection state of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No token, no connection.
    #[default]
    Idle,
    Connecting,
    Connected,
    /// The server rejected the token. Nothing happens until it changes.
    AuthFailed,
    /// Connection lost or failed; retry `attempt` fires after `retry_in`.
    Disconnected { attempt: u32, retry_in: Duration },
    /// Retry budget used up for this token.
    Exhausted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
            SessionStatus::AuthFailed => "auth_failed",
            SessionStatus::Disconnected { .. } => "disconnected",
            SessionStatus::Exhausted => "exhausted",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionStatus::Connected)
    }

    /// The UI should ask the user to log in again.
    pub fn needs_login(&self) -> bool {
        matches!(self, SessionStatus::AuthFailed)
    }
}
