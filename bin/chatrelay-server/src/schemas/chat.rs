//! Chat relay request / response bodies.

use chatrelay_prompt::{ChatReply, ResponseMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Request body for `POST /api/chat/`.
///
/// `message` is kept as raw JSON so that a non-string value is reported as
/// `Message is required` rather than a deserialisation failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    #[schema(value_type = String)]
    pub message: Option<Value>,
}

/// Response body for `POST /api/chat/`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatResponse {
    /// Upstream reply, with boxed notation removed when enabled.
    pub response: String,
    /// `"math"`, `"list"` or `"text"`.
    #[schema(value_type = String)]
    pub format: ResponseMode,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            response: reply.text,
            format: reply.format_tag,
        }
    }
}
