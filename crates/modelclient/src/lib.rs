//! Client plumbing for the remote model service: opening the duplex
//! stream and decoding its response body into typed events.

use std::pin::Pin;

use futures_core::Stream;

pub mod connection;
pub mod frame;
pub mod mock;

pub use connection::{HttpModelServiceConnection, ModelServiceConnection};
pub use mock::MockModelServiceConnection;

/// A boxed, pinned stream, matching the teacher's `BoxStream` alias.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;
