use crate::error::ChatError;
use crate::session::{Answer, ChatSession};
use paperqa_llm::ProtocolEvent;
use paperqa_types::Transcript;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

const UPDATE_BUFFER: usize = 256;

/// Progress of a background exchange
#[derive(Debug)]
pub enum ChatUpdate {
    Content(String),
    Sources(Vec<String>),
    /// Always the last update
    Finished(Result<Answer, ChatError>),
}

/// Shareable front for a [`ChatSession`] that runs exchanges on spawned tasks
#[derive(Clone)]
pub struct ChatHandle {
    inner: Arc<Mutex<ChatSession>>,
    in_flight: Arc<AtomicBool>,
}

impl ChatHandle {
    pub fn new(session: ChatSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start answering `question` in the background.
    ///
    /// Fails with [`ChatError::Busy`] while a previous answer is still running. A
    /// concurrent [`transcript`](Self::transcript) or [`set_model`](Self::set_model) only
    /// delays the start. Must be called from within a Tokio runtime.
    pub fn submit(&self, question: impl Into<String>) -> Result<UpdateReceiver, ChatError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ChatError::Busy);
        }
        let in_flight = InFlight(Arc::clone(&self.in_flight));
        let inner = Arc::clone(&self.inner);

        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(ChatError::Cancelled),
                result = async {
                    let mut session = inner.lock().await;
                    run_exchange(&mut session, &question, &tx).await
                } => result,
            };
            // Clear before reporting so a follow-up submit is accepted
            drop(in_flight);
            let _ = tx.send(ChatUpdate::Finished(outcome)).await;
        });

        Ok(UpdateReceiver { rx, cancel })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Snapshot of the conversation; waits for a running exchange to end
    pub async fn transcript(&self) -> Transcript {
        self.inner.lock().await.transcript().clone()
    }

    pub async fn set_model(&self, model: Option<String>) {
        self.inner.lock().await.set_model(model);
    }
}

/// Clears the in-flight flag when the background task ends, however it ends
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

async fn run_exchange(
    session: &mut ChatSession,
    question: &str,
    tx: &mpsc::Sender<ChatUpdate>,
) -> Result<Answer, ChatError> {
    let mut exchange = session.begin(question).await?;

    while let Some(event) = exchange.next_event().await? {
        let update = match event {
            ProtocolEvent::ContentDelta { content } => ChatUpdate::Content(content),
            ProtocolEvent::SourcesUpdate { sources } => ChatUpdate::Sources(sources),
            ProtocolEvent::Completion | ProtocolEvent::Failure { .. } => continue,
        };
        if tx.send(update).await.is_err() {
            tracing::debug!("Update receiver dropped, cancelling exchange");
            return Err(ChatError::Cancelled);
        }
    }

    exchange.finish().await
}

/// Updates for one submitted question. Dropping it cancels the exchange.
pub struct UpdateReceiver {
    rx: mpsc::Receiver<ChatUpdate>,
    cancel: CancellationToken,
}

impl UpdateReceiver {
    pub async fn recv(&mut self) -> Option<ChatUpdate> {
        self.rx.recv().await
    }

    /// Ask the background task to stop; a `Finished(Err(Cancelled))` update follows
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Skip remaining updates and wait for the final result
    pub async fn outcome(mut self) -> Result<Answer, ChatError> {
        while let Some(update) = self.rx.recv().await {
            if let ChatUpdate::Finished(result) = update {
                return result;
            }
        }
        Err(ChatError::Closed)
    }
}

impl Drop for UpdateReceiver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
