use paperqa_types::TranscriptError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("An answer is already streaming")]
    Busy,

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Transport error: {0:#}")]
    Transport(anyhow::Error),

    /// Message reported by the server, unchanged
    #[error("{0}")]
    Remote(String),

    #[error("Answer cancelled")]
    Cancelled,

    #[error("Exchange is closed")]
    Closed,

    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

impl ChatError {
    /// True when the answer was stopped on the caller's side rather than failing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChatError::Cancelled)
    }
}
