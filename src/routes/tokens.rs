// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login and logout.

use super::MessageResponse;
use crate::error::{AppError, Result};
use crate::models::{Credentials, IssuedToken, Scope};
use crate::services::{password, RequestContext};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{delete, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

/// Login, open to anyone.
pub fn login_routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/tokens/authentication", post(create_authentication_token))
}

/// Logout, for authenticated callers.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/tokens/authentication", delete(revoke_authentication_tokens))
}

#[derive(Serialize)]
pub struct AuthenticationResponse {
    pub authentication_token: IssuedToken,
}

async fn create_authentication_token(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthenticationResponse>)> {
    let Json(input) = body?;
    input.validate()?;

    let user = state
        .db
        .get_user_by_email(&input.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !password::verify(&input.password, &user.password_hash).await? {
        tracing::debug!(user_id = user.id, "Password mismatch");
        return Err(AppError::InvalidCredentials);
    }

    let authentication_token = state
        .tokens
        .issue(user.id, state.config.auth_token_ttl, Scope::Authentication)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthenticationResponse {
            authentication_token,
        }),
    ))
}

async fn revoke_authentication_tokens(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<MessageResponse>> {
    let user = state.permissions.require_authenticated(&ctx)?;
    let revoked = state.tokens.revoke(user.id, Scope::Authentication).await?;
    tracing::info!(user_id = user.id, revoked, "Logged out");
    Ok(MessageResponse::new("authentication tokens revoked"))
}
