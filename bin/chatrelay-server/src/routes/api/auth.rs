//! Account routes: registration and token login.
//!
//! Password hashing and verification run on the blocking pool; bcrypt is
//! deliberately slow and would otherwise stall the async workers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use bcrypt::BcryptError;
use tracing::{info, warn};
use utoipa::OpenApi;
use validator::{Validate, ValidationErrors};

use crate::auth::{generate_key, hash_password, validate_password, verify_password};
use crate::entities::{is_unique_violation, NewUser, TokenStore, UserRecord, UserStore};
use crate::error::ServerError;
use crate::schemas::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::state::AppState;

const ALL_FIELDS_REQUIRED: &str = "All fields are required";
const PASSWORDS_DIFFER: &str = "Passwords do not match";
const USERNAME_TAKEN: &str = "Username already exists";
const EMAIL_TAKEN: &str = "Email already in use";
const LOGIN_FIELDS_REQUIRED: &str = "Both username and password are required";
const INVALID_CREDENTIALS: &str = "Invalid credentials or inactive account";

#[derive(OpenApi)]
#[openapi(
    paths(register, login),
    components(schemas(RegisterRequest, RegisterResponse, LoginRequest, LoginResponse))
)]
pub struct AuthApi;

/// Register account routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register/", post(register))
        .route("/login/", post(login))
}

/// Create a new account (`POST /api/register/`).
///
/// An API token is issued together with the account, but only returned by
/// `/api/login/`.
#[utoipa::path(
    post,
    path = "/api/register/",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing fields, weak password or name taken"),
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ServerError> {
    let Json(req) = body.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;

    let (Some(username), Some(email), Some(password), Some(confirm)) = (
        non_empty(&req.username),
        non_empty(&req.email),
        non_empty(&req.password),
        non_empty(&req.confirm_password),
    ) else {
        return Err(ServerError::BadRequest(ALL_FIELDS_REQUIRED.into()));
    };

    if password != confirm {
        return Err(ServerError::BadRequest(PASSWORDS_DIFFER.into()));
    }

    validate_password(password).map_err(|problems| ServerError::BadRequest(problems.join("\n")))?;
    req.validate()
        .map_err(|errors| ServerError::BadRequest(validation_message(&errors)))?;

    if state.store.username_exists(username).await? {
        return Err(ServerError::BadRequest(USERNAME_TAKEN.into()));
    }
    if state.store.email_exists(email).await? {
        return Err(ServerError::BadRequest(EMAIL_TAKEN.into()));
    }

    let cost = state.config.bcrypt_cost;
    let plain = password.to_owned();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&plain, cost))
        .await?
        .map_err(|e| ServerError::Internal(format!("password hashing failed: {e}")))?;

    let new_user = NewUser {
        username: username.to_owned(),
        email: email.to_owned(),
        password_hash,
    };

    // A concurrent registration can still win the race for the username.
    match state.store.create_user_with_token(new_user, &generate_key()).await {
        Ok((user, token)) => info!(
            user_id = user.id,
            username = %user.username,
            joined = %user.date_joined,
            token_created = %token.created,
            "user registered"
        ),
        Err(e) if is_unique_violation(&e) => {
            return Err(ServerError::BadRequest(USERNAME_TAKEN.into()));
        }
        Err(e) => return Err(e.into()),
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
        }),
    ))
}

/// Exchange credentials for an API token (`POST /api/login/`).
///
/// Repeated logins return the same token.
#[utoipa::path(
    post,
    path = "/api/login/",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials or inactive account"),
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ServerError> {
    let Json(req) = body.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;

    let (Some(username), Some(password)) = (non_empty(&req.username), non_empty(&req.password))
    else {
        return Err(ServerError::BadRequest(LOGIN_FIELDS_REQUIRED.into()));
    };

    let Some(user) = authenticate(&state, username, password, verify_password).await? else {
        return Err(ServerError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let token = state.store.get_or_create_token(user.id, &generate_key()).await?;
    state.store.touch_last_login(user.id).await?;
    info!(
        user_id = user.id,
        member_since = %user.date_joined,
        previous_login = ?user.last_login,
        token_created = %token.created,
        "user logged in"
    );

    Ok(Json(LoginResponse {
        token: token.key,
        user_id: token.user_id,
        username: user.username,
        email: user.email,
    }))
}

/// Resolve `username` to an active account whose password matches.
///
/// bcrypt runs on every call, against a throwaway hash when the username is
/// unknown, so a failed login takes the same time either way.
async fn authenticate<F>(
    state: &AppState,
    username: &str,
    password: &str,
    verify: F,
) -> Result<Option<UserRecord>, ServerError>
where
    F: FnOnce(&str, &str) -> Result<bool, BcryptError> + Send + 'static,
{
    let user = state.store.find_user_by_username(username).await?;
    let hash = match &user {
        Some(user) => user.password_hash.clone(),
        None => state.dummy_password_hash.clone(),
    };

    let plain = password.to_owned();
    let verified = tokio::task::spawn_blocking(move || verify(&plain, &hash))
        .await?
        .unwrap_or_else(|e| {
            warn!(username, error = %e, "stored password hash is unreadable");
            false
        });

    Ok(user.filter(|user| verified && user.is_active))
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Flatten field errors into one message per line, ordered by field name.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", e.code),
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}
