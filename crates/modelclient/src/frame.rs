//! Decodes the model service's response body into [`DownstreamEvent`]
//! frames.
//!
//! The body is newline-delimited JSON: each complete line is one
//! `{event: {<kind>: <payload>}}` envelope. This mirrors the teacher's
//! SSE buffer-drain-then-parse idiom, adapted from `data:`-prefixed
//! blocks to bare NDJSON lines since the model service has no SSE
//! framing of its own.

use sg_domain::error::{Error, Result};
use sg_domain::protocol::wire::{DownstreamEvent, Frame};

use crate::BoxStream;

/// Extract complete lines from an NDJSON buffer, leaving any trailing
/// partial line for the next call.
pub(crate) fn drain_lines(buffer: &mut String) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    lines
}

/// Build a [`BoxStream`] of decoded [`Frame<DownstreamEvent>`]s from the
/// model service's chunked response body.
pub fn downstream_event_stream(
    response: reqwest::Response,
) -> BoxStream<'static, Result<Frame<DownstreamEvent>>> {
    let stream = async_stream::stream! {
        let mut response = response;
        let mut buffer = String::new();

        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    buffer.push_str(&String::from_utf8_lossy(&bytes));
                    for line in drain_lines(&mut buffer) {
                        yield parse_line(&line);
                    }
                }
                Ok(None) => {
                    if !buffer.trim().is_empty() {
                        yield parse_line(buffer.trim());
                    }
                    break;
                }
                Err(e) => {
                    yield Err(Error::transport(format!("reading model service stream: {e}")));
                    break;
                }
            }
        }
    };

    Box::pin(stream)
}

fn parse_line(line: &str) -> Result<Frame<DownstreamEvent>> {
    serde_json::from_str(line).map_err(Error::Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_single_complete_line() {
        let mut buf = String::from("{\"a\":1}\n");
        let lines = drain_lines(&mut buf);
        assert_eq!(lines, vec!["{\"a\":1}"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn drain_leaves_partial_line_in_buffer() {
        let mut buf = String::from("{\"a\":1}\n{\"b\":2");
        let lines = drain_lines(&mut buf);
        assert_eq!(lines, vec!["{\"a\":1}"]);
        assert_eq!(buf, "{\"b\":2");
    }

    #[test]
    fn drain_multiple_lines_at_once() {
        let mut buf = String::from("{\"a\":1}\n{\"b\":2}\n");
        let lines = drain_lines(&mut buf);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn parse_line_rejects_malformed_json() {
        assert!(parse_line("not json").is_err());
    }

    #[test]
    fn parse_line_decodes_text_output() {
        let line = r#"{"event":{"textOutput":{"content":"hi","role":"ASSISTANT"}}}"#;
        let frame = parse_line(line).unwrap();
        match frame.event {
            DownstreamEvent::TextOutput { content, role, .. } => {
                assert_eq!(content, "hi");
                assert_eq!(role.as_deref(), Some("ASSISTANT"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
