// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-client admission control, first in the pipeline.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

/// Reject the request with 429 if its client has no tokens left.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if state.rate_limiter.is_enabled() {
        let client = client_key(&request);
        if !state.rate_limiter.admit(&client) {
            tracing::warn!(client = %client, "Rate limit exceeded");
            return AppError::RateLimited.into_response();
        }
    }
    next.run(request).await
}

/// Client address as seen by the listener.
fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
