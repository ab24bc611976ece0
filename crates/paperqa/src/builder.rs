//! High-level builder API for chat sessions

use crate::{ChatHandle, ChatSession, ClientConfig, Language, PaperApiClient, Session};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Builds a [`ChatSession`] talking to a paperqa server over HTTP
///
/// # Example
///
/// ```rust,no_run
/// use paperqa::prelude::*;
///
/// # fn main() -> Result<()> {
/// let chat = ChatBuilder::new("3f2c9a")
///     .base_url("http://localhost:8000/api")
///     .model("gpt-5-mini")
///     .language(Language::Ko)
///     .connect_timeout(5)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChatBuilder {
    session: Session,
    client: ClientConfig,
}

impl ChatBuilder {
    /// Start from the session id the server returned on upload
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session: Session::new(session_id),
            client: ClientConfig::default(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.base_url = base_url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.session.model = Some(model.into());
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.session.language = language;
        self
    }

    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.client.connect_timeout_secs = Some(secs);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.client.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<ChatSession> {
        if self.session.id.trim().is_empty() {
            anyhow::bail!("Session id must not be empty");
        }

        let client = PaperApiClient::new(self.client).context("Failed to build paper API client")?;
        Ok(ChatSession::new(self.session, Arc::new(client)))
    }

    /// Build a session wrapped for use from several tasks
    pub fn build_handle(self) -> Result<ChatHandle> {
        Ok(ChatHandle::new(self.build()?))
    }
}
