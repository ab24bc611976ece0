// Stream controller: one question in, one answer (or failure) out

use crate::error::ChatError;
use futures::StreamExt;
use paperqa_llm::{parse_event_stream, AskTransport, EventStream, ProtocolEvent};
use paperqa_types::{Message, Session, Step, Transcript, TranscriptError};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// How a successful answer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The server sent `done`
    Completed,
    /// The transport closed without `done`; the answer was kept as received
    EndOfData,
}

/// A finalized assistant answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub content: String,
    pub sources: Vec<String>,
    pub end: StreamEnd,
}

/// A document-scoped conversation bound to a transport.
///
/// Owns the transcript. Only one exchange can be open at a time since
/// [`begin`](Self::begin) borrows the session mutably for the exchange's lifetime.
pub struct ChatSession {
    session: Session,
    transport: Arc<dyn AskTransport>,
    transcript: Transcript,
}

impl ChatSession {
    pub fn new(session: Session, transport: Arc<dyn AskTransport>) -> Self {
        Self {
            session,
            transport,
            transcript: Transcript::new(),
        }
    }

    /// Continue from a restored history
    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_model(&mut self, model: Option<String>) {
        self.session.model = model;
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Record the question, open the transport and return the live exchange.
    ///
    /// If opening fails the placeholder is removed and the question stays in the
    /// transcript. Dropping the returned future before it resolves has the same effect.
    pub async fn begin(&mut self, question: &str) -> Result<Exchange<'_>, ChatError> {
        if question.trim().is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        self.transcript
            .begin_exchange(question)
            .map_err(|e| match e {
                TranscriptError::ExchangeInProgress => ChatError::Busy,
                other => ChatError::Transcript(other),
            })?;

        tracing::info!(
            session_id = %self.session.id,
            model = ?self.session.model,
            question_len = question.len(),
            "Starting exchange"
        );

        let request = self.session.ask_request(question);
        let mut exchange = Exchange {
            transcript: &mut self.transcript,
            events: None,
            state: ExchangeState::Streaming,
            started: Instant::now(),
        };

        match self.transport.open(request).await {
            Ok(chunks) => {
                exchange.events = Some(parse_event_stream(chunks));
                Ok(exchange)
            }
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "Failed to open answer stream");
                exchange.fail();
                Err(ChatError::Transport(e))
            }
        }
    }

    /// Ask and wait for the whole answer
    pub async fn ask(&mut self, question: &str) -> Result<Answer, ChatError> {
        self.begin(question).await?.finish().await
    }

    /// Like [`ask`](Self::ask), but gives up as soon as `token` is cancelled
    pub async fn ask_cancellable(
        &mut self,
        question: &str,
        token: &CancellationToken,
    ) -> Result<Answer, ChatError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(ChatError::Cancelled),
            result = self.ask(question) => result,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExchangeState {
    Streaming,
    Ended(StreamEnd),
    Failed,
}

/// One in-flight answer.
///
/// Yields events in arrival order after applying each to the transcript. Dropping the
/// exchange before a terminal event closes the transport and removes the partial
/// answer, exactly as a failure would.
pub struct Exchange<'a> {
    transcript: &'a mut Transcript,
    events: Option<EventStream>,
    state: ExchangeState,
    started: Instant,
}

impl<'a> Exchange<'a> {
    /// Next applied event, or `None` once the answer has ended.
    ///
    /// `Completion` is yielded once; nothing after it is read. A remote `error` event or a
    /// transport failure rolls the answer back and is returned as an error.
    pub async fn next_event(&mut self) -> Result<Option<ProtocolEvent>, ChatError> {
        if self.state != ExchangeState::Streaming {
            return Ok(None);
        }
        let Some(events) = self.events.as_mut() else {
            return Ok(None);
        };

        match events.next().await {
            Some(Ok(event)) => match self.transcript.apply_event(event.clone())? {
                Step::Pending => Ok(Some(event)),
                Step::Completed => {
                    self.end(StreamEnd::Completed);
                    Ok(Some(event))
                }
                Step::Failed { message } => {
                    tracing::warn!(error = %message, "Server reported an error");
                    self.state = ExchangeState::Failed;
                    self.events = None;
                    Err(ChatError::Remote(message))
                }
            },
            Some(Err(e)) => {
                tracing::warn!(error = %format!("{:#}", e), "Answer stream failed");
                self.fail();
                Err(ChatError::Transport(e))
            }
            None => {
                tracing::warn!("Answer stream ended without completion");
                self.transcript.apply_event(ProtocolEvent::Completion)?;
                self.end(StreamEnd::EndOfData);
                Ok(None)
            }
        }
    }

    /// Drain the remaining events and return the finalized answer
    pub async fn finish(mut self) -> Result<Answer, ChatError> {
        while self.next_event().await?.is_some() {}

        let ExchangeState::Ended(end) = self.state else {
            return Err(ChatError::Closed);
        };
        let message = self
            .transcript
            .last()
            .ok_or(ChatError::Transcript(TranscriptError::NoStreamingMessage))?;

        Ok(Answer {
            content: message.content().to_string(),
            sources: message.sources().to_vec(),
            end,
        })
    }

    /// Stop streaming and discard the partial answer
    pub fn cancel(self) {
        drop(self);
    }

    /// Answer text received so far
    pub fn partial(&self) -> &str {
        let message = match self.state {
            ExchangeState::Streaming => self.transcript.streaming_message(),
            ExchangeState::Ended(_) => self.transcript.last(),
            ExchangeState::Failed => None,
        };
        message.map(Message::content).unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.state != ExchangeState::Streaming
    }

    pub fn transcript(&self) -> &Transcript {
        &*self.transcript
    }

    fn end(&mut self, end: StreamEnd) {
        self.state = ExchangeState::Ended(end);
        self.events = None;
        tracing::info!(
            end = ?end,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            answer_len = self.partial().len(),
            "Exchange finished"
        );
    }

    fn fail(&mut self) {
        self.state = ExchangeState::Failed;
        self.events = None;
        self.transcript.abort_exchange();
    }
}

impl Drop for Exchange<'_> {
    fn drop(&mut self) {
        if self.state == ExchangeState::Streaming {
            self.events = None;
            if self.transcript.abort_exchange() {
                tracing::info!(
                    elapsed_ms = self.started.elapsed().as_millis() as u64,
                    "Exchange cancelled"
                );
            }
        }
    }
}
