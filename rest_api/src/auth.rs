//! Registration, login, and the bearer-token extractor that gates every
//! record route.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use models::medical::{Login, RegisterPayload, User};
use models::ValidationError;
use security::{AuthError, TokenKind, TokenPair};

use crate::{ApiError, ApiJson, AppState};

/// The requesting account, resolved from the `Authorization` header.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|hv| hv.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Auth("missing or invalid authorization header".to_string()))?;

        let claims = security::validate_token(
            token,
            state.config.jwt_secret.as_bytes(),
            TokenKind::Access,
        )?;

        // The account may have been removed since the token was issued.
        let user = state
            .store
            .get_user(claims.uid)
            .await?
            .ok_or_else(|| ApiError::Auth("unknown account".to_string()))?;
        Ok(AuthUser(user))
    }
}

fn issue_pair(state: &AppState, user: &User) -> Result<TokenPair, AuthError> {
    security::issue_token_pair(
        user.id,
        &user.username,
        state.config.jwt_secret.as_bytes(),
        state.config.access_ttl_secs,
        state.config.refresh_ttl_secs,
    )
}

// Handler for POST /api/auth/register
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new_user = payload.validate()?;

    let mut report = ValidationError::new();
    if state
        .store
        .find_user_by_username(&new_user.username)
        .await?
        .is_some()
    {
        report.add("username", "a user with that username already exists");
    }
    if state
        .store
        .find_user_by_email(&new_user.email)
        .await?
        .is_some()
    {
        report.add("email", "a user with that email already exists");
    }
    report.into_result()?;

    let password_hash = security::hash_password(&new_user.password)?;
    let user = state.store.create_user(&new_user, &password_hash).await?;
    let tokens = issue_pair(&state, &user)?;
    info!(username = %user.username, "registered new account");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": user.account_info(),
            "tokens": tokens,
        })),
    ))
}

// Handler for POST /api/auth/login
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(login): ApiJson<Login>,
) -> Result<Json<Value>, ApiError> {
    // Unknown usernames and wrong passwords fail identically.
    let user = state
        .store
        .find_user_by_username(&login.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !security::verify_password(&login.password, &user.password_hash)? {
        warn!(username = %login.username, "failed login attempt");
        return Err(AuthError::InvalidCredentials.into());
    }

    state.store.touch_last_login(user.id).await?;
    let tokens = issue_pair(&state, &user)?;
    info!(username = %user.username, "login successful");

    Ok(Json(json!({
        "message": "Login successful",
        "user": user.account_info(),
        "tokens": tokens,
    })))
}
