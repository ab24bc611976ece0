use paperqa_llm::{AskRequest, StorylineRequest, SummarizeRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Language the storyline analysis is written in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ko,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ko => "ko",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported language: {0} (expected \"en\" or \"ko\")")]
pub struct ParseLanguageError(pub String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ko" => Ok(Language::Ko),
            other => Err(ParseLanguageError(other.to_string())),
        }
    }
}

/// One document-scoped conversation, as addressed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub language: Language,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: None,
            language: Language::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Request body for a question in this session
    pub fn ask_request(&self, question: impl Into<String>) -> AskRequest {
        AskRequest {
            session_id: self.id.clone(),
            question: question.into(),
            model: self.model.clone(),
        }
    }

    pub fn summarize_request(&self) -> SummarizeRequest {
        SummarizeRequest {
            session_id: self.id.clone(),
            custom_prompt: None,
            model: self.model.clone(),
        }
    }

    /// Storyline request in this session's language
    pub fn storyline_request(&self) -> StorylineRequest {
        StorylineRequest {
            session_id: self.id.clone(),
            model: self.model.clone(),
            language: self.language.code().to_string(),
        }
    }
}
