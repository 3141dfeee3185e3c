//! Chat relay route.
//!
//! The user message is classified, shaped with mode-specific instructions and
//! forwarded to the upstream provider as a single-turn completion. The reply
//! comes back tagged with the detected mode.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::routing::post;
use axum::{Extension, Json, Router};
use chatrelay_prompt::{build_reply, classify, ChatReply};
use serde_json::Value;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::middleware::AuthenticatedUser;
use crate::schemas::chat::{ChatRequest, ChatResponse};
use crate::state::AppState;

/// Maximum allowed message length in bytes to prevent memory exhaustion.
const MAX_MESSAGE_BYTES: usize = 128 * 1024; // 128 KiB

const MESSAGE_REQUIRED: &str = "Message is required";

#[derive(OpenApi)]
#[openapi(paths(chat), components(schemas(ChatRequest, ChatResponse)))]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat/", post(chat))
}

/// Relay one message to the chatbot (`POST /api/chat/`).
#[utoipa::path(
    post,
    path = "/api/chat/",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply generated", body = ChatResponse),
        (status = 400, description = "Message missing, empty or too large"),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "Upstream provider unavailable"),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Json(req) = body.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;

    let message = match req.message {
        Some(Value::String(text)) if !text.is_empty() => text,
        _ => return Err(ServerError::BadRequest(MESSAGE_REQUIRED.into())),
    };

    if message.len() > MAX_MESSAGE_BYTES {
        return Err(ServerError::BadRequest(format!(
            "message too large ({} bytes); maximum is {} bytes",
            message.len(),
            MAX_MESSAGE_BYTES,
        )));
    }

    let classification = classify(&message);
    let mode = classification.mode;
    debug!(user_id = user.id, %mode, message_len = message.len(), "classified chat message");

    let referer = request_base_url(&headers);
    let raw = state
        .provider
        .complete(&classification.shaped_prompt, referer.as_deref())
        .await?;

    let reply = if state.config.strip_boxed {
        build_reply(mode, &raw)
    } else {
        ChatReply::verbatim(mode, raw)
    };

    info!(user_id = user.id, username = %user.username, %mode, reply_len = reply.text.len(), "chat reply relayed");
    Ok(Json(reply.into()))
}

/// `scheme://host/` of the incoming request, honouring `X-Forwarded-Proto`.
fn request_base_url(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    Some(format!("{scheme}://{host}/"))
}
