// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gotogym: a workout tracking API.
//!
//! Every request passes a per-client rate limiter, bearer-token
//! authentication and a permission gate before it reaches a handler.
//! Updates to workouts, exercises and users use optimistic concurrency
//! control on a per-record version counter.

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::{Authenticator, PermissionGate, RateLimiter, TokenStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub rate_limiter: Arc<RateLimiter>,
    pub tokens: TokenStore,
    pub authenticator: Authenticator,
    pub permissions: PermissionGate,
}

impl AppState {
    /// Wire the services over an open database.
    pub fn new(config: Config, db: Db) -> Self {
        let tokens = TokenStore::new(db.clone());
        Self {
            rate_limiter: Arc::new(RateLimiter::new(&config.limiter)),
            authenticator: Authenticator::new(tokens.clone()),
            permissions: PermissionGate::new(db.clone()),
            tokens,
            config,
            db,
        }
    }
}
