// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guards layered onto groups of routes with `route_layer`.

use crate::error::AppError;
use crate::services::RequestContext;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// State for [`require_permission`]: which code the guarded routes need.
#[derive(Clone)]
pub struct Requirement {
    pub state: Arc<AppState>,
    pub code: &'static str,
}

/// Only activated users holding `requirement.code` get through.
pub async fn require_permission(
    State(requirement): State<Requirement>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = context(&request);
    requirement
        .state
        .permissions
        .require_permission(&ctx, requirement.code)
        .await?;
    Ok(next.run(request).await)
}

/// Only authenticated users get through.
pub async fn require_authenticated(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    state.permissions.require_authenticated(&context(&request))?;
    Ok(next.run(request).await)
}

/// The context set by `authenticate`, or anonymous if it never ran.
fn context(request: &Request) -> RequestContext {
    request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default()
}
