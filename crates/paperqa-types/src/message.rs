use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
///
/// User messages never change after creation. An assistant message is only mutated by
/// the transcript while its `streaming` flag is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: Uuid,
    role: Role,
    content: String,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    streaming: bool,
    created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: String, streaming: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            sources: Vec::new(),
            streaming,
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), false)
    }

    /// A finished assistant answer
    pub fn assistant<I, S>(content: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut message = Self::new(Role::Assistant, content.into(), false);
        message.replace_sources(sources.into_iter().map(Into::into).collect());
        message
    }

    /// Empty assistant message waiting for its answer
    pub(crate) fn placeholder() -> Self {
        Self::new(Role::Assistant, String::new(), true)
    }

    pub(crate) fn append(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Keep first occurrences only, in order
    pub(crate) fn replace_sources(&mut self, sources: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(sources.len());
        for source in sources {
            if !unique.contains(&source) {
                unique.push(source);
            }
        }
        self.sources = unique;
    }

    pub(crate) fn finalize(&mut self) {
        self.streaming = false;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
