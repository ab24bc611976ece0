use serde::{Deserialize, Serialize};

/// Body of a question about an uploaded paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub session_id: String,
    pub question: String,

    /// Model override; the server default is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AskRequest {
    pub fn new(session_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            question: question.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Non-streaming answer with the passages it drew on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub session_id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
}
