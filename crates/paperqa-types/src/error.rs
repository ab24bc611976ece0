use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("An answer is still streaming")]
    ExchangeInProgress,

    #[error("No answer is streaming")]
    NoStreamingMessage,

    #[error("Message {0} is still marked as streaming")]
    StreamingInHistory(usize),
}

pub type Result<T> = std::result::Result<T, TranscriptError>;
