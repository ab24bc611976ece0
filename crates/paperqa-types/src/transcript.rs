use crate::error::{Result, TranscriptError};
use crate::message::Message;
use paperqa_llm::ProtocolEvent;
use serde::{Deserialize, Serialize};

/// Where an exchange stands after one event has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// More events are expected
    Pending,
    /// The answer was finalized
    Completed,
    /// The placeholder was removed; carries the remote message
    Failed { message: String },
}

impl Step {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Step::Pending)
    }
}

/// Ordered conversation history.
///
/// At most one message streams at a time and it is always the last one. The only ways
/// to change the history are [`begin_exchange`](Self::begin_exchange),
/// [`apply_event`](Self::apply_event) and [`abort_exchange`](Self::abort_exchange).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Message>", into = "Vec<Message>")]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the question and an empty streaming answer
    pub fn begin_exchange(&mut self, question: impl Into<String>) -> Result<()> {
        if self.is_streaming() {
            return Err(TranscriptError::ExchangeInProgress);
        }

        self.messages.push(Message::user(question));
        self.messages.push(Message::placeholder());
        Ok(())
    }

    /// Apply one protocol event to the streaming answer
    pub fn apply_event(&mut self, event: ProtocolEvent) -> Result<Step> {
        let message = self.streaming_mut().ok_or(TranscriptError::NoStreamingMessage)?;

        match event {
            ProtocolEvent::ContentDelta { content } => {
                message.append(&content);
                Ok(Step::Pending)
            }
            ProtocolEvent::SourcesUpdate { sources } => {
                message.replace_sources(sources);
                Ok(Step::Pending)
            }
            ProtocolEvent::Completion => {
                message.finalize();
                Ok(Step::Completed)
            }
            ProtocolEvent::Failure { error } => {
                self.messages.pop();
                Ok(Step::Failed { message: error })
            }
        }
    }

    /// Drop the streaming answer, if any. The question stays.
    pub fn abort_exchange(&mut self) -> bool {
        if !self.is_streaming() {
            return false;
        }

        if let Some(message) = self.messages.pop() {
            tracing::debug!(
                message_id = %message.id(),
                partial_len = message.content().len(),
                "Discarded streaming answer"
            );
        }
        true
    }

    pub fn is_streaming(&self) -> bool {
        self.messages.last().is_some_and(Message::is_streaming)
    }

    /// The answer currently being streamed
    pub fn streaming_message(&self) -> Option<&Message> {
        self.messages.last().filter(|m| m.is_streaming())
    }

    fn streaming_mut(&mut self) -> Option<&mut Message> {
        self.messages.last_mut().filter(|m| m.is_streaming())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl TryFrom<Vec<Message>> for Transcript {
    type Error = TranscriptError;

    /// Restore a saved history. Nothing can resume a streaming answer, so one is rejected.
    fn try_from(messages: Vec<Message>) -> Result<Self> {
        if let Some(index) = messages.iter().position(Message::is_streaming) {
            return Err(TranscriptError::StreamingInHistory(index));
        }
        Ok(Self { messages })
    }
}

impl From<Transcript> for Vec<Message> {
    fn from(transcript: Transcript) -> Self {
        transcript.messages
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
