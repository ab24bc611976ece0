use std::pin::Pin;
use anyhow::Result;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::buffer_utils::{dispatch_line, Dispatch, Ignored, LineFramer, DATA_PREFIX};
use crate::traits::ByteStream;

/// One unit of meaning carried by the answer stream.
///
/// Serializes to the wire payload, e.g. `{"type":"content","content":"Hel"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProtocolEvent {
    /// Text to append to the streaming answer
    #[serde(rename = "content")]
    ContentDelta {
        content: String,
    },

    /// Replacement source list for the streaming answer
    #[serde(rename = "sources")]
    SourcesUpdate {
        sources: Vec<String>,
    },

    /// The answer is complete; nothing follows
    #[serde(rename = "done")]
    Completion,

    /// The request failed remotely; nothing follows
    #[serde(rename = "error")]
    Failure {
        error: String,
    },
}

impl ProtocolEvent {
    /// Discriminants understood by the dispatcher
    pub const KINDS: [&'static str; 4] = ["content", "sources", "done", "error"];

    pub fn content(text: impl Into<String>) -> Self {
        Self::ContentDelta {
            content: text.into(),
        }
    }

    pub fn sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SourcesUpdate {
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            error: message.into(),
        }
    }

    /// Wire discriminant of this event
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ContentDelta { .. } => "content",
            Self::SourcesUpdate { .. } => "sources",
            Self::Completion => "done",
            Self::Failure { .. } => "error",
        }
    }

    /// True for `Completion` and `Failure`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completion | Self::Failure { .. })
    }

    /// Encode as a data line terminated by a blank line, as a server would send it
    pub fn to_data_line(&self) -> serde_json::Result<String> {
        Ok(format!("{}{}\n\n", DATA_PREFIX, serde_json::to_string(self)?))
    }
}

pub type EventStream = Pin<Box<dyn Stream<Item = Result<ProtocolEvent>> + Send>>;

/// Frame transport chunks into lines and dispatch them into protocol events.
///
/// Lines that carry no event are skipped. A transport error is yielded once and
/// ends the stream; otherwise the unterminated tail is flushed at end of data.
pub fn parse_event_stream(chunks: ByteStream) -> EventStream {
    Box::pin(async_stream::stream! {
        let mut chunks = chunks;
        let mut framer = LineFramer::with_capacity(4096);
        let mut failed = false;

        while let Some(chunk_result) = chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    framer.extend(&bytes);

                    while let Some(line) = framer.next_line() {
                        if let Some(event) = dispatch(&line) {
                            yield Ok(event);
                        }
                    }
                }
                Err(e) => {
                    yield Err(e.context("Stream error"));
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            if let Some(line) = framer.finish() {
                if let Some(event) = dispatch(&line) {
                    yield Ok(event);
                }
            }
        }
    })
}

fn dispatch(line: &str) -> Option<ProtocolEvent> {
    match dispatch_line(line) {
        Dispatch::Event(event) => Some(event),
        Dispatch::Ignored(Ignored::NotData) => None,
        Dispatch::Ignored(reason) => {
            tracing::debug!(?reason, line, "Skipping undecodable stream line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(parts: &[&str]) -> ByteStream {
        let items: Vec<Result<Vec<u8>>> = parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        Box::pin(stream::iter(items))
    }

    #[tokio::test]
    async fn test_split_content_yields_single_delta() {
        let events: Vec<ProtocolEvent> = parse_event_stream(chunks(&[
            "data: {\"type\":\"content\",\"content\":\"Hel",
            "lo\"}\n",
        ]))
        .map(|e| e.unwrap())
        .collect()
        .await;

        assert_eq!(events, vec![ProtocolEvent::content("Hello")]);
    }

    #[tokio::test]
    async fn test_unterminated_tail_is_flushed() {
        let events: Vec<ProtocolEvent> = parse_event_stream(chunks(&[
            "data: {\"type\":\"content\",\"content\":\"a\"}\n\n",
            "data: {\"type\":\"done\"}",
        ]))
        .map(|e| e.unwrap())
        .collect()
        .await;

        assert_eq!(
            events,
            vec![ProtocolEvent::content("a"), ProtocolEvent::Completion]
        );
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let items: Vec<Result<Vec<u8>>> = vec![
            Ok(b"data: {\"type\":\"content\",\"content\":\"partial\"}\n".to_vec()),
            Err(anyhow::anyhow!("connection reset")),
            Ok(b"data: {\"type\":\"done\"}\n".to_vec()),
        ];
        let results: Vec<Result<ProtocolEvent>> =
            parse_event_stream(Box::pin(stream::iter(items))).collect().await;

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &ProtocolEvent::content("partial")
        );
        let err = results[1].as_ref().unwrap_err();
        assert!(format!("{:#}", err).contains("connection reset"));
    }

    #[test]
    fn test_event_serialization_matches_wire() {
        let json = serde_json::to_string(&ProtocolEvent::content("Hi")).unwrap();
        assert_eq!(json, r#"{"type":"content","content":"Hi"}"#);

        let json = serde_json::to_string(&ProtocolEvent::Completion).unwrap();
        assert_eq!(json, r#"{"type":"done"}"#);

        let line = ProtocolEvent::failure("boom").to_data_line().unwrap();
        assert_eq!(line, "data: {\"type\":\"error\",\"error\":\"boom\"}\n\n");
    }

    #[test]
    fn test_terminal_events() {
        assert!(ProtocolEvent::Completion.is_terminal());
        assert!(ProtocolEvent::failure("x").is_terminal());
        assert!(!ProtocolEvent::content("x").is_terminal());
        assert!(!ProtocolEvent::sources(["p1"]).is_terminal());
        assert_eq!(ProtocolEvent::sources(["p1"]).kind(), "sources");
    }
}
