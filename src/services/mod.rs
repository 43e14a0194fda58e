// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - request admission and access control.

pub mod authenticator;
pub mod password;
pub mod permissions;
pub mod rate_limiter;
pub mod tokens;

pub use authenticator::{Authenticator, RequestContext};
pub use permissions::PermissionGate;
pub use rate_limiter::RateLimiter;
pub use tokens::TokenStore;
