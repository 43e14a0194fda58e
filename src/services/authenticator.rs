// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resolve the `Authorization` header of a request to an [`Identity`].

use crate::error::AppError;
use crate::models::{Identity, Permissions, Scope};
use crate::services::TokenStore;
use axum::http::HeaderValue;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Per-request authentication state, attached to the request by the
/// `authenticate` middleware and read by every permission gate after it.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub identity: Identity,
    /// Permission codes, loaded at most once per request.
    pub permissions: Arc<OnceCell<Permissions>>,
}

impl RequestContext {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            permissions: Arc::default(),
        }
    }
}

/// Turns bearer tokens into identities.
#[derive(Clone)]
pub struct Authenticator {
    tokens: TokenStore,
}

impl Authenticator {
    pub fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }

    /// Resolve the identity behind an optional `Authorization` header.
    ///
    /// A missing header is the anonymous identity. Anything other than
    /// `Bearer <token>` is [`AppError::InvalidAuthHeader`]. A token that is
    /// malformed, unknown or expired is [`AppError::InvalidCredentials`],
    /// with no hint as to which.
    pub async fn authenticate(&self, header: Option<&HeaderValue>) -> Result<Identity, AppError> {
        let Some(header) = header else {
            return Ok(Identity::Anonymous);
        };

        let token = parse_bearer(header).ok_or(AppError::InvalidAuthHeader)?;

        match self.tokens.user_for_token(Scope::Authentication, token).await? {
            Some(user) => Ok(Identity::User(user)),
            None => Err(AppError::InvalidCredentials),
        }
    }
}

/// Extract the token from `Bearer <token>`.
fn parse_bearer(header: &HeaderValue) -> Option<&str> {
    let value = header.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme != "Bearer" || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}
