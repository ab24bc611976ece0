use serde::{Deserialize, Serialize};

/// Body of a whole-paper summary request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub session_id: String,

    /// Replaces the server's summary instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl SummarizeRequest {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            custom_prompt: None,
            model: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub session_id: String,
    pub summary: String,
    /// Model that wrote the summary
    pub model: String,
}

/// Body of a storyline analysis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorylineRequest {
    pub session_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Language code the storyline is written in ("en" or "ko")
    pub language: String,
}

impl StorylineRequest {
    pub fn new(session_id: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            model: None,
            language: language.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorylineResponse {
    pub session_id: String,
    pub storyline: String,
    pub model: String,
}
