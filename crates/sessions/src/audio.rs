//! Audio input pipeline (§4.5): decouples the client socket's receive
//! rate from the upstream serializer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::session::Session;

const CAPACITY: usize = 200;
const BATCH_SIZE: usize = 5;

/// Bounded FIFO of base64-encoded PCM16 buffers awaiting serialization
/// into `audioInput` events. Drops the oldest chunk on overflow,
/// preferring to preserve the most recent speech.
#[derive(Default)]
pub struct PendingAudioQueue {
    buffers: Mutex<VecDeque<String>>,
}

impl PendingAudioQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, chunk: String) {
        let mut buffers = self.buffers.lock().expect("pending audio queue lock poisoned");
        if buffers.len() >= CAPACITY {
            buffers.pop_front();
        }
        buffers.push_back(chunk);
    }

    /// Drains up to [`BATCH_SIZE`] chunks. Returns fewer (or none) if the
    /// queue has less than a full batch.
    pub fn drain_batch(&self) -> Vec<String> {
        let mut buffers = self.buffers.lock().expect("pending audio queue lock poisoned");
        let take = buffers.len().min(BATCH_SIZE);
        buffers.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.buffers.lock().expect("pending audio queue lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The single consumer task: drains up to a batch at a time, serializes
/// each chunk as an `audioInput` event, and self-reschedules immediately
/// if more remain rather than waiting out a full tick (§4.5).
pub async fn run(session: Arc<Session>) {
    loop {
        if session.close.is_closed() {
            return;
        }

        let batch = session.pending_audio.drain_batch();
        if batch.is_empty() {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(20)) => {}
                _ = session.close.wait() => return,
            }
            continue;
        }

        for chunk in batch {
            let _ = session.stream_audio(chunk).await;
        }

        if session.pending_audio.is_empty() {
            tokio::task::yield_now().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_at_most_five_per_batch() {
        let queue = PendingAudioQueue::new();
        for i in 0..8 {
            queue.push(i.to_string());
        }
        let batch = queue.drain_batch();
        assert_eq!(batch.len(), 5);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn drops_oldest_on_overflow() {
        let queue = PendingAudioQueue::new();
        for i in 0..(CAPACITY + 10) {
            queue.push(i.to_string());
        }
        assert_eq!(queue.len(), CAPACITY);
        let batch = queue.drain_batch();
        // the oldest 10 entries (0..10) should have been dropped
        assert_eq!(batch[0], "10");
    }

    #[test]
    fn drain_on_empty_queue_returns_empty() {
        let queue = PendingAudioQueue::new();
        assert!(queue.drain_batch().is_empty());
    }
}
