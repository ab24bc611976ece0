// HTTP client for the paper Q&A API

use crate::config::ClientConfig;
use crate::streaming::{parse_event_stream, EventStream};
use crate::traits::{AskTransport, ByteStream};
use crate::types::{
    AskRequest, AskResponse, ModelInfo, StorylineRequest, StorylineResponse, SummarizeRequest,
    SummarizeResponse,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Paper Q&A client (plain HTTP, one attempt per call)
#[derive(Debug, Clone)]
pub struct PaperApiClient {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl PaperApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Client against the default local server
    pub fn local() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Ask without streaming; the full answer arrives in one response
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse> {
        self.post_json("ask", request).await
    }

    /// Summary of the whole paper
    pub async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeResponse> {
        self.post_json("summarize", request).await
    }

    /// Storyline analysis of the paper, written in `request.language`
    pub async fn storyline(&self, request: &StorylineRequest) -> Result<StorylineResponse> {
        self.post_json("storyline", request).await
    }

    /// Models the server can answer with
    pub async fn models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .http_client
            .get(self.config.endpoint("models"))
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Paper API error ({}): {}", status, error_text);
        }

        response
            .json::<Vec<ModelInfo>>()
            .await
            .context("Failed to parse model list")
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.config.endpoint(path))
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Paper API error ({}): {}", status, error_text);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse {} response", path))
    }

    /// Open the answer stream and decode it into protocol events
    pub async fn ask_stream(&self, request: AskRequest) -> Result<EventStream> {
        let bytes = self.open(request).await?;
        Ok(parse_event_stream(bytes))
    }
}

#[async_trait]
impl AskTransport for PaperApiClient {
    async fn open(&self, request: AskRequest) -> Result<ByteStream> {
        tracing::debug!(session_id = %request.session_id, model = ?request.model, "Opening answer stream");

        let response = self
            .http_client
            .post(self.config.endpoint("ask/stream"))
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(&request)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Paper API error ({}): {}", status, error_text);
        }

        let chunks = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| anyhow::Error::new(e).context("Failed to read answer stream"))
        });

        Ok(Box::pin(chunks))
    }
}
