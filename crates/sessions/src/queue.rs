//! Per-session upstream event queue (C3): a strict FIFO of
//! already-constructed protocol events, serialized as NDJSON frames for
//! the model-service duplex request body.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_core::Stream;
use sg_domain::protocol::wire::{Frame, UpstreamEvent};

use crate::close::CloseSignal;
use crate::session::Session;

/// Outcome of racing the queue against the session's close signal, per
/// the "control-flow-via-exceptions" redesign: normal termination is a
/// tagged value, not an error.
pub enum NextEvent {
    Event(UpstreamEvent),
    Closed,
}

/// Strict FIFO; the serializer never reorders. Unbounded in principle —
/// in practice backpressured by the audio producer's own drop-oldest
/// queue (§4.5).
pub struct UpstreamQueue {
    events: Mutex<VecDeque<UpstreamEvent>>,
    notify: tokio::sync::Notify,
    close: CloseSignal,
}

impl UpstreamQueue {
    pub fn new(close: CloseSignal) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            notify: tokio::sync::Notify::new(),
            close,
        }
    }

    /// Appends an event and wakes any waiter. Fails silently if the
    /// session is already closing, per §4.2.
    pub fn enqueue(&self, event: UpstreamEvent) {
        if self.close.is_closed() {
            return;
        }
        self.events.lock().expect("upstream queue lock poisoned").push_back(event);
        self.notify.notify_one();
    }

    /// Suspends until either the queue is non-empty or the close signal
    /// fires.
    pub async fn next(&self) -> NextEvent {
        loop {
            if let Some(event) = self.events.lock().expect("upstream queue lock poisoned").pop_front() {
                return NextEvent::Event(event);
            }
            if self.close.is_closed() {
                return NextEvent::Closed;
            }

            let notified = self.notify.notified();
            tokio::select! {
                _ = notified => {}
                _ = self.close.wait() => {}
            }
        }
    }
}

/// Serializes an [`UpstreamEvent`] into the `{"event": {...}}\n` NDJSON
/// frame the model service expects on the wire.
pub fn serialize_frame(event: UpstreamEvent) -> Bytes {
    let mut json = serde_json::to_vec(&Frame::new(event)).unwrap_or_default();
    json.push(b'\n');
    Bytes::from(json)
}

/// The pull iterator (§4.2) the model-service stream consumes: drains
/// the session's upstream queue and yields serialized frame bytes until
/// the close signal fires.
pub fn upstream_byte_stream(session: Arc<Session>) -> Pin<Box<dyn Stream<Item = Bytes> + Send + 'static>> {
    let stream = async_stream::stream! {
        loop {
            match session.upstream.next().await {
                NextEvent::Event(event) => yield serialize_frame(event),
                NextEvent::Closed => break,
            }
        }
    };
    Box::pin(stream)
}
