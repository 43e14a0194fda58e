// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token scopes and issued tokens.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Activation,
    Authentication,
}

impl Scope {
    /// Convert to database string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Authentication => "authentication",
        }
    }
}

/// A freshly issued token. The plaintext exists only here; the database
/// keeps just its hash.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expiry: DateTime<Utc>,
    #[serde(skip)]
    pub user_id: i64,
    #[serde(skip)]
    pub scope: Scope,
}
