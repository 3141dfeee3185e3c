//! Token authentication for protected routes.
//!
//! Expects `Authorization: Token <key>`. On success the resolved
//! [`AuthenticatedUser`] is stored in the request extensions for handlers to
//! pick up with `Extension<AuthenticatedUser>`.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::auth::{parse_authorization, HeaderProblem};
use crate::entities::TokenStore;
use crate::error::ServerError;
use crate::state::AppState;

pub const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
pub const INVALID_TOKEN: &str = "Invalid token.";
pub const INACTIVE_USER: &str = "User inactive or deleted.";

/// The caller behind a valid token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

pub async fn require_token(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| ServerError::Unauthorized(INVALID_TOKEN.into()))?,
        ),
        None => None,
    };

    let key = parse_authorization(header).map_err(|problem| match problem {
        HeaderProblem::Missing => ServerError::Unauthorized(MISSING_CREDENTIALS.into()),
        HeaderProblem::Malformed => ServerError::Unauthorized(INVALID_TOKEN.into()),
    })?;

    let user = state
        .store
        .find_user_by_token(key)
        .await?
        .ok_or_else(|| ServerError::Unauthorized(INVALID_TOKEN.into()))?;

    if !user.is_active {
        return Err(ServerError::Unauthorized(INACTIVE_USER.into()));
    }

    debug!(user_id = user.id, "token authenticated");
    req.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        username: user.username,
    });
    Ok(next.run(req).await)
}
