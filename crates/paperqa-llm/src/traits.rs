use crate::types::AskRequest;
use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Raw chunks of an answer stream, as read off the wire
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Opens one answer stream per question.
///
/// Implementations make a single attempt: an `Err` here is a transport-open failure,
/// an `Err` item inside the returned stream is a mid-stream failure.
#[async_trait]
pub trait AskTransport: Send + Sync {
    async fn open(&self, request: AskRequest) -> Result<ByteStream>;
}
