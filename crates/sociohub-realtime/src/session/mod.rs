//! Realtime session management.
//!
//! One [`SessionManager`] per running app keeps exactly one live connection
//! for the current token, reconnects with bounded linear backoff, and stops
//! for good on an auth failure until the token changes.

mod driver;
mod manager;
pub mod retry;
mod status;
pub mod subscriptions;

pub use manager::SessionManager;
pub use retry::{RetryPolicy, RetryState, RetryTimer};
pub use status::SessionStatus;
pub use subscriptions::SubscriptionSet;
