//! Shared fixtures for router tests: an in-memory store and a scripted
//! upstream provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::dummy_password_hash;
use crate::config::Config;
use crate::entities::SqliteStore;
use crate::provider::{ChatProvider, ProviderError};
use crate::state::AppState;

/// What the stub answers on every call.
pub(crate) enum StubReply {
    Text(String),
    Status(u16),
    Malformed,
}

/// Records every `(prompt, referer)` it is asked to complete.
pub(crate) struct StubProvider {
    reply: StubReply,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl StubProvider {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(StubReply::Text(text.to_owned()))
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for StubProvider {
    async fn complete(&self, prompt: &str, referer: Option<&str>) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_owned(), referer.map(str::to_owned)));
        match &self.reply {
            StubReply::Text(text) => Ok(text.clone()),
            StubReply::Status(status) => Err(ProviderError::Status {
                status: *status,
                body: "rate limited".into(),
            }),
            StubReply::Malformed => Err(ProviderError::MalformedResponse("no choices".into())),
        }
    }
}

pub(crate) fn test_config() -> Config {
    let mut config = Config::from_lookup(|_| None);
    config.bcrypt_cost = 4;
    config
}

pub(crate) async fn test_state_with(config: Config, provider: Arc<StubProvider>) -> Arc<AppState> {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    let dummy_password_hash = dummy_password_hash(config.bcrypt_cost).unwrap();
    Arc::new(AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        provider: provider as Arc<dyn ChatProvider>,
        dummy_password_hash,
    })
}

pub(crate) async fn test_state(provider: Arc<StubProvider>) -> Arc<AppState> {
    test_state_with(test_config(), provider).await
}

/// Drive one request through `app` and decode the JSON reply.
pub(crate) async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(raw) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_owned())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub(crate) async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, &[], Some(&body.to_string())).await
}

/// Register `username` and log in, returning the token key.
pub(crate) async fn register_and_login(app: &Router, username: &str) -> String {
    let (status, _) = post_json(
        app,
        "/api/register/",
        serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "Tr1cky-Secret",
            "confirmPassword": "Tr1cky-Secret",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(
        app,
        "/api/login/",
        serde_json::json!({ "username": username, "password": "Tr1cky-Secret" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_owned()
}
