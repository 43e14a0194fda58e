// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod exercises;
pub mod tokens;
pub mod users;
pub mod workouts;

use crate::error::{AppError, FieldErrors, Result};
use crate::filters::{parse_filters, Filters, ListParams};
use crate::middleware::{self as mw, Requirement};
use crate::services::permissions::{WORKOUTS_READ, WORKOUTS_WRITE};
use crate::AppState;
use axum::extract::{rejection::PathRejection, Path, State};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct SystemInfo {
    pub environment: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub system_info: SystemInfo,
}

/// Health check response
async fn healthcheck(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "available".to_string(),
        system_info: SystemInfo {
            environment: state.config.env.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

/// JSON body for unmatched routes.
async fn not_found() -> AppError {
    AppError::NotFound("the requested resource could not be found".to_string())
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let guard = |code: &'static str| {
        middleware::from_fn_with_state(
            Requirement {
                state: state.clone(),
                code,
            },
            mw::require_permission,
        )
    };

    // Anyone may call these
    let public_routes = Router::new()
        .route("/v1/healthcheck", get(healthcheck))
        .merge(users::routes())
        .merge(tokens::login_routes());

    let read_routes = Router::new()
        .merge(workouts::read_routes())
        .merge(exercises::read_routes())
        .route_layer(guard(WORKOUTS_READ));

    let write_routes = Router::new()
        .merge(workouts::write_routes())
        .merge(exercises::write_routes())
        .route_layer(guard(WORKOUTS_WRITE));

    let session_routes = tokens::session_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        mw::require_authenticated,
    ));

    // Layers run outside-in in reverse order of addition.
    Router::new()
        .merge(public_routes)
        .merge(read_routes)
        .merge(write_routes)
        .merge(session_routes)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), mw::authenticate))
        .layer(middleware::from_fn_with_state(state.clone(), mw::rate_limit))
        .layer(middleware::from_fn(mw::security::add_security_headers))
        .layer(CatchPanicLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Record id from the path. Anything that is not a positive integer is
/// treated as a missing resource.
pub(crate) fn read_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    match path {
        Ok(Path(id)) if id >= 1 => Ok(id),
        Ok(_) => Err(AppError::NotFound(
            "the requested resource could not be found".to_string(),
        )),
        Err(rejection) => Err(rejection.into()),
    }
}

/// Validate pagination for a list endpoint, reporting any resource-specific
/// filter `errors` alongside pagination ones.
pub(crate) fn list_filters(
    params: &ListParams,
    safelist: &'static [&'static str],
    errors: FieldErrors,
) -> Result<Filters> {
    match parse_filters(params, safelist) {
        Ok(filters) if errors.is_empty() => Ok(filters),
        Ok(_) => Err(AppError::Validation(errors)),
        Err(AppError::Validation(mut fields)) => {
            fields.extend(errors);
            Err(AppError::Validation(fields))
        }
        Err(err) => Err(err),
    }
}

/// `{"message": ...}` body for operations with nothing else to return.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}
