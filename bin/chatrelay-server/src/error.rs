//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are converted to a JSON body
//! `{"error": "..."}` with an appropriate status code.
//!
//! Internal errors (Database, Internal) are logged with full detail but only
//! a generic message is returned to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::provider::ProviderError;

/// All errors that can occur in the chatrelay-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing, invalid or rejected credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The upstream chat-completion provider could not be reached or refused
    /// the request.
    #[error("Chatbot service error: {0}")]
    Upstream(String),

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            ServerError::Upstream(_) => {
                warn!(error = %self, "upstream provider unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(e: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("blocking task failed: {e}"))
    }
}

impl From<ProviderError> for ServerError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Transport(_) | ProviderError::Status { .. } => {
                ServerError::Upstream(e.to_string())
            }
            ProviderError::MalformedResponse(_) => ServerError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: ServerError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bad_request_exposes_message() {
        let (status, body) = body_of(ServerError::BadRequest("Message is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_401() {
        let (status, body) = body_of(ServerError::Unauthorized("Invalid token.".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token.");
    }

    #[tokio::test]
    async fn upstream_maps_to_503_with_prefix() {
        let (status, body) = body_of(ServerError::Upstream("connection refused".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Chatbot service error: connection refused");
    }

    #[tokio::test]
    async fn internal_detail_is_hidden() {
        let (status, body) = body_of(ServerError::Internal("secret path /etc/x".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }

    #[test]
    fn malformed_upstream_reply_is_internal() {
        let err: ServerError = ProviderError::MalformedResponse("no choices".into()).into();
        assert!(matches!(err, ServerError::Internal(_)));
    }

    #[test]
    fn upstream_status_is_unavailable() {
        let err: ServerError = ProviderError::Status {
            status: 429,
            body: "rate limited".into(),
        }
        .into();
        assert!(matches!(err, ServerError::Upstream(_)));
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn anyhow_becomes_internal() {
        let err: ServerError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, ServerError::Internal(_)));
    }
}
