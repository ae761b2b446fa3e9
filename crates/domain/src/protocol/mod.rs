//! The two wire protocols the gateway terminates:
//!
//! - [`client`] / [`event`]: the browser/telephony-facing message set,
//!   carried over the client's WebSocket.
//! - [`wire`]: the JSON envelope exchanged with the remote model
//!   service over its duplex HTTP/2 stream.

pub mod client;
pub mod event;
pub mod wire;

pub use client::*;
pub use event::*;
pub use wire::*;
