// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (rate limiting, authentication, authorization, headers).

pub mod auth;
pub mod permissions;
pub mod rate_limit;
pub mod security;

pub use auth::authenticate;
pub use permissions::{require_authenticated, require_permission, Requirement};
pub use rate_limit::rate_limit;
