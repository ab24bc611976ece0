pub mod error;
pub mod handle;
pub mod session;

pub use error::ChatError;
pub use handle::{ChatHandle, ChatUpdate, UpdateReceiver};
pub use session::{Answer, ChatSession, Exchange, StreamEnd};
