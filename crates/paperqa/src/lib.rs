//! # Paperqa - streaming Q&A over research papers
//!
//! Ask questions about a paper that has been uploaded to a paperqa server and receive
//! the answer token by token:
//! - **Incremental streaming**: chunks are framed into lines, decoded into typed events and
//!   applied to the conversation as they arrive
//! - **Safe cancellation**: dropping an exchange (or cancelling a token) removes the
//!   partial answer and keeps the question
//! - **Math rendering**: bracketed formulas are normalized to `$$…$$` display blocks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paperqa::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut chat = ChatBuilder::new("3f2c9a")
//!         .base_url("http://localhost:8000/api")
//!         .model("gpt-5-mini")
//!         .build()?;
//!
//!     let answer = chat.ask("What problem does the paper solve?").await?;
//!     println!("{}", normalize(&answer.content));
//!     println!("Sources: {}", answer.sources.join(", "));
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming Response
//!
//! ```rust,no_run
//! use paperqa::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut chat = ChatBuilder::new("3f2c9a").build()?;
//!
//!     let mut exchange = chat.begin("Summarize section 3").await?;
//!     while let Some(event) = exchange.next_event().await? {
//!         if let ProtocolEvent::ContentDelta { content } = event {
//!             print!("{}", content);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **paperqa-llm**: protocol events, line framer, event dispatcher, HTTP transport
//! - **paperqa-types**: sessions, messages and the transcript reducer
//! - **paperqa-chat**: the stream controller (`ChatSession`, `Exchange`, `ChatHandle`)
//! - **paperqa-markup**: math notation normalizer

// Re-export all public APIs
pub use paperqa_chat as chat;
pub use paperqa_llm as llm;
pub use paperqa_markup as markup;
pub use paperqa_types as types;

// Re-export commonly used types
pub use paperqa_chat::{Answer, ChatError, ChatHandle, ChatSession, ChatUpdate, Exchange, StreamEnd};
pub use paperqa_llm::{
    AskTransport, ClientConfig, PaperApiClient, ProtocolEvent, StorylineRequest, SummarizeRequest,
};
pub use paperqa_markup::normalize;
pub use paperqa_types::{Language, Message, Role, Session, Transcript};

/// High-level builder for chat sessions
pub mod builder;

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::builder::ChatBuilder;
    pub use crate::chat::{Answer, ChatError, ChatHandle, ChatSession, ChatUpdate, StreamEnd};
    pub use crate::llm::ProtocolEvent;
    pub use crate::markup::normalize;
    pub use crate::types::{Language, Session};
    pub use anyhow::Result;
}
