//! Opens and frames the duplex stream to the remote model service.
//!
//! The model service itself is treated as an opaque duplex byte stream
//! over HTTP/2 (its SDK is out of scope); what lives here is the
//! gateway's own client plumbing: building the request, streaming the
//! upstream body, and decoding the response body into [`DownstreamEvent`]
//! frames.

use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;

use sg_domain::config::ModelServiceConfig;
use sg_domain::error::{Error, Result};
use sg_domain::protocol::wire::{DownstreamEvent, Frame};

use crate::frame::downstream_event_stream;
use crate::BoxStream;

/// Opens a duplex connection to the model service for one session and
/// returns the decoded downstream event stream. `upstream` is a stream
/// of already-serialized upstream frame bytes (see C3's pull iterator).
#[async_trait::async_trait]
pub trait ModelServiceConnection: Send + Sync {
    async fn connect(
        &self,
        session_id: &str,
        upstream: Pin<Box<dyn Stream<Item = Bytes> + Send + 'static>>,
    ) -> Result<BoxStream<'static, Result<Frame<DownstreamEvent>>>>;
}

/// `reqwest`-backed implementation. Streams the request body from the
/// session's upstream queue and decodes the response body as
/// newline-delimited JSON frames.
pub struct HttpModelServiceConnection {
    client: reqwest::Client,
    config: ModelServiceConfig,
}

impl HttpModelServiceConnection {
    pub fn new(config: ModelServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| Error::transport(format!("building model-service http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, session_id: &str) -> String {
        format!(
            "https://model-service.{}.internal/v1/sessions/{}/stream",
            self.config.region, session_id
        )
    }
}

#[async_trait::async_trait]
impl ModelServiceConnection for HttpModelServiceConnection {
    async fn connect(
        &self,
        session_id: &str,
        upstream: Pin<Box<dyn Stream<Item = Bytes> + Send + 'static>>,
    ) -> Result<BoxStream<'static, Result<Frame<DownstreamEvent>>>> {
        let body = reqwest::Body::wrap_stream(upstream.map(Ok::<Bytes, std::io::Error>));

        let response = self
            .client
            .post(self.endpoint(session_id))
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::transport(format!("connecting to model service: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::transport(format!(
                "model service returned {}",
                response.status()
            )));
        }

        Ok(downstream_event_stream(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_includes_region_and_session() {
        let conn = HttpModelServiceConnection::new(ModelServiceConfig {
            region: "us-west-2".into(),
            ..Default::default()
        })
        .unwrap();
        let url = conn.endpoint("abc123");
        assert!(url.contains("us-west-2"));
        assert!(url.contains("abc123"));
    }
}
