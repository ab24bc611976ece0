pub mod ask;
pub mod model;
pub mod report;

pub use ask::{AskRequest, AskResponse};
pub use model::ModelInfo;
pub use report::{StorylineRequest, StorylineResponse, SummarizeRequest, SummarizeResponse};
