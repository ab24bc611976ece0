pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod client;
pub mod config;

pub use traits::{AskTransport, ByteStream};

pub use streaming::{parse_event_stream, EventStream, ProtocolEvent};
pub use buffer_utils::{dispatch_line, Dispatch, Ignored, LineFramer, DATA_PREFIX};
pub use client::PaperApiClient;
pub use config::{ClientConfig, DEFAULT_API_BASE};
pub use types::{
    AskRequest, AskResponse, ModelInfo, StorylineRequest, StorylineResponse, SummarizeRequest,
    SummarizeResponse,
};
