pub mod error;
pub mod message;
pub mod session;
pub mod transcript;

pub use error::{Result, TranscriptError};
pub use message::{Message, Role};
pub use session::{Language, ParseLanguageError, Session};
pub use transcript::{Step, Transcript};
