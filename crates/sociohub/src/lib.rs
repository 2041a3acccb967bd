//! Top-level facade crate for SocioHub.
//!
//! Re-exports the protocol core and the realtime client so apps can depend on a single crate.

pub mod core {
    pub use sociohub_core::*;
}

pub mod realtime {
    pub use sociohub_realtime::*;
}
