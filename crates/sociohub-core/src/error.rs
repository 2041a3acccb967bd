//! Shared error type across SocioHub crates.

use thiserror::Error;

/// Stable codes surfaced to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed message or config.
    BadRequest,
    /// Session token rejected; the user must log in again.
    AuthFailed,
    /// Connection-level failure (retryable).
    Transport,
    /// Operation timed out (retryable).
    Timeout,
    /// No live connection.
    NotConnected,
    /// Unsupported config/protocol version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and UI messages.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AuthFailed => "AUTH_FAILED",
            ClientCode::Transport => "TRANSPORT",
            ClientCode::Timeout => "TIMEOUT",
            ClientCode::NotConnected => "NOT_CONNECTED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, SocioHubError>;

/// Unified error type used by core and realtime.
#[derive(Debug, Error)]
pub enum SocioHubError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("auth failed")]
    AuthFailed,
    #[error("transport: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("not connected")]
    NotConnected,
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl SocioHubError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            SocioHubError::BadRequest(_) => ClientCode::BadRequest,
            SocioHubError::AuthFailed => ClientCode::AuthFailed,
            SocioHubError::Transport(_) => ClientCode::Transport,
            SocioHubError::Timeout => ClientCode::Timeout,
            SocioHubError::NotConnected => ClientCode::NotConnected,
            SocioHubError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            SocioHubError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Authentication failures are terminal for the token that caused them.
    pub fn is_auth(&self) -> bool {
        matches!(self, SocioHubError::AuthFailed)
    }

    /// Whether the session manager may retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SocioHubError::Transport(_) | SocioHubError::Timeout)
    }
}
