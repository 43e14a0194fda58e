// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.

use crate::services::RequestContext;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Resolve the caller's identity and attach a [`RequestContext`].
///
/// Requests without an `Authorization` header continue as anonymous; a bad
/// header or token ends the request here. Every response, including those
/// rejections, varies on `Authorization`.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match state
        .authenticator
        .authenticate(request.headers().get(header::AUTHORIZATION))
        .await
    {
        Ok(identity) => identity,
        Err(err) => return vary_on_authorization(err.into_response()),
    };

    request
        .extensions_mut()
        .insert(RequestContext::new(identity));

    vary_on_authorization(next.run(request).await)
}

fn vary_on_authorization(mut response: Response) -> Response {
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}
