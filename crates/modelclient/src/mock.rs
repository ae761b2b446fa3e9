//! An in-memory [`ModelServiceConnection`] for tests that don't want a
//! real HTTP round trip against the model service.

use std::pin::Pin;
use std::sync::Mutex;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::stream;

use sg_domain::error::Result;
use sg_domain::protocol::wire::{DownstreamEvent, Frame};

use crate::connection::ModelServiceConnection;
use crate::BoxStream;

/// Replays a fixed, injected sequence of downstream frames regardless of
/// what's written to the upstream body. The upstream stream is drained
/// to completion but its contents are discarded.
pub struct MockModelServiceConnection {
    frames: Mutex<Option<Vec<Result<Frame<DownstreamEvent>>>>>,
}

impl MockModelServiceConnection {
    pub fn new(frames: Vec<Result<Frame<DownstreamEvent>>>) -> Self {
        Self {
            frames: Mutex::new(Some(frames)),
        }
    }
}

#[async_trait::async_trait]
impl ModelServiceConnection for MockModelServiceConnection {
    async fn connect(
        &self,
        _session_id: &str,
        mut upstream: Pin<Box<dyn Stream<Item = Bytes> + Send + 'static>>,
    ) -> Result<BoxStream<'static, Result<Frame<DownstreamEvent>>>> {
        use futures_util::StreamExt;
        while upstream.next().await.is_some() {}

        let frames = self
            .frames
            .lock()
            .expect("mock frames lock poisoned")
            .take()
            .unwrap_or_default();
        Ok(Box::pin(stream::iter(frames)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_injected_frames() {
        use futures_util::StreamExt;

        let frame = Frame {
            event: DownstreamEvent::TextOutput {
                content: "hi".into(),
                role: Some("ASSISTANT".into()),
                additional_model_fields: None,
            },
        };
        let mock = MockModelServiceConnection::new(vec![Ok(frame)]);
        let upstream: Pin<Box<dyn Stream<Item = Bytes> + Send>> = Box::pin(stream::empty());
        let mut out = mock.connect("s1", upstream).await.unwrap();
        let first = out.next().await.unwrap().unwrap();
        match first.event {
            DownstreamEvent::TextOutput { content, .. } => assert_eq!(content, "hi"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(out.next().await.is_none());
    }
}
