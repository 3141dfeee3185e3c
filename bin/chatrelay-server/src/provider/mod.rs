//! Upstream chat-completion providers.
//!
//! Handlers talk to [`ChatProvider`]; the production implementation is
//! [`openrouter::OpenRouterClient`], an OpenAI-compatible HTTP client.

pub mod openrouter;

use async_trait::async_trait;
use thiserror::Error;

pub use openrouter::OpenRouterClient;

/// Errors produced while talking to the upstream provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, timeout or TLS problem.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered 2xx but the body had no usable reply.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

/// A single-turn chat completion.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send `prompt` as the sole user message and return the reply text.
    ///
    /// `referer` is the absolute base URL of the originating request, passed
    /// through for provider-side attribution.
    async fn complete(&self, prompt: &str, referer: Option<&str>) -> Result<String, ProviderError>;
}
