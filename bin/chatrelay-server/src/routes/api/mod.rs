pub mod auth;
pub mod chat;

use crate::middleware::auth::require_token;
use crate::state::AppState;
use utoipa::OpenApi;

use axum::{middleware, Router};
use std::sync::Arc;

/// Routes nested under `/api`. Registration and login are public; chat
/// requires a token.
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = chat::router().route_layer(middleware::from_fn_with_state(state, require_token));

    Router::new().merge(auth::router()).merge(protected)
}

#[derive(OpenApi)]
#[openapi()]
pub struct RelayApi;

pub fn api_docs() -> utoipa::openapi::OpenApi {
    let mut doc = RelayApi::openapi();
    doc.merge(auth::AuthApi::openapi());
    doc.merge(chat::ChatApi::openapi());
    doc
}
