//! OpenAI-compatible chat-completion client (OpenRouter by default).
//!
//! Request body: `{"model": .., "messages": [{"role": "user", "content": ..}]}`.
//! The reply is read from `choices[0].message.content`. One attempt per call;
//! retries are left to the client of the relay.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ChatProvider, ProviderError};
use crate::config::UpstreamConfig;

/// Connect timeout, separate from the whole-request timeout in the config.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on how much of an upstream error body is echoed back.
const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 1],
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReply,
}

#[derive(Deserialize)]
struct WireReply {
    content: Option<String>,
}

/// Shared HTTP client bound to one upstream endpoint and model.
///
/// Built once at startup; `reqwest::Client` pools connections internally.
pub struct OpenRouterClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    app_title: String,
}

impl OpenRouterClient {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("chatrelay-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            app_title: cfg.app_title.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatProvider for OpenRouterClient {
    async fn complete(&self, prompt: &str, referer: Option<&str>) -> Result<String, ProviderError> {
        let body = WireRequest {
            model: &self.model,
            messages: [WireMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("X-Title", &self.app_title)
            .json(&body);
        if let Some(referer) = referer {
            request = request.header("HTTP-Referer", referer);
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(
            status = status.as_u16(),
            latency_ms = started.elapsed().as_millis(),
            bytes = text.len(),
            "upstream responded"
        );

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let reply = extract_reply(&text)?;
        info!(model = %self.model, reply_len = reply.len(), "upstream completion done");
        Ok(reply)
    }
}

/// Pull `choices[0].message.content` out of a chat-completion body.
fn extract_reply(body: &str) -> Result<String, ProviderError> {
    let parsed: WireResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ProviderError::MalformedResponse("no choices[0].message.content".into()))
}
