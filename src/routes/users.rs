// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and activation.

use crate::error::{AppError, Result};
use crate::models::{ActivateUser, IssuedToken, RegisterUser, Scope, User};
use crate::services::permissions::WORKOUTS_READ;
use crate::services::{password, TokenStore};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

/// Public user routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/users", post(register_user))
        .route("/v1/users/activated", put(activate_user))
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Registration response. The activation token is only ever shown here.
#[derive(Serialize)]
pub struct RegistrationResponse {
    pub user: User,
    pub activation_token: IssuedToken,
}

fn is_unique_violation(err: &AppError) -> bool {
    matches!(err, AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation())
}

async fn register_user(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RegisterUser>, JsonRejection>,
) -> Result<(StatusCode, Json<RegistrationResponse>)> {
    let Json(input) = body?;
    input.validate()?;

    let user = User {
        id: 0,
        created_at: Utc::now(),
        name: input.name,
        email: input.email,
        password_hash: password::hash(&input.password, state.config.bcrypt_cost).await?,
        activated: false,
        version: 1,
    };

    let activation = state.tokens.mint(state.config.activation_token_ttl)?;
    let registered = state
        .db
        .register_user(
            &user,
            &[WORKOUTS_READ],
            &activation.hash,
            activation.expiry.timestamp(),
        )
        .await;
    let user = match registered {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => {
            return Err(AppError::invalid_field(
                "email",
                "a user with this email address already exists",
            ))
        }
        Err(err) => return Err(err),
    };
    let activation_token = activation.issued(user.id, Scope::Activation);

    tracing::info!(user_id = user.id, "Registered user");

    Ok((
        StatusCode::ACCEPTED,
        Json(RegistrationResponse {
            user,
            activation_token,
        }),
    ))
}

async fn activate_user(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<ActivateUser>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let Json(input) = body?;
    if input.token.is_empty() {
        return Err(AppError::invalid_field("token", "must be provided"));
    }
    if !TokenStore::is_well_formed(&input.token) {
        return Err(AppError::invalid_field("token", "must be 22 characters long"));
    }

    let mut user = state
        .tokens
        .user_for_token(Scope::Activation, &input.token)
        .await?
        .ok_or_else(|| AppError::invalid_field("token", "invalid or expired activation token"))?;

    user.activated = true;
    let user = state.db.users().update(&user).await?;
    state.tokens.revoke(user.id, Scope::Activation).await?;

    tracing::info!(user_id = user.id, "Activated user");

    Ok(Json(UserResponse { user }))
}
