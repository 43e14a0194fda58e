// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization decisions for an already-authenticated request.

use crate::db::Db;
use crate::error::AppError;
use crate::models::User;
use crate::services::RequestContext;

pub const WORKOUTS_READ: &str = "workouts:read";
pub const WORKOUTS_WRITE: &str = "workouts:write";

/// Checks identities against required permission codes.
#[derive(Clone)]
pub struct PermissionGate {
    db: Db,
}

impl PermissionGate {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// The request must carry a user identity.
    pub fn require_authenticated<'a>(&self, ctx: &'a RequestContext) -> Result<&'a User, AppError> {
        ctx.identity.user().ok_or(AppError::AuthenticationRequired)
    }

    /// The request must carry an activated user identity.
    pub fn require_activated<'a>(&self, ctx: &'a RequestContext) -> Result<&'a User, AppError> {
        let user = self.require_authenticated(ctx)?;
        if !user.activated {
            return Err(AppError::InactiveAccount);
        }
        Ok(user)
    }

    /// The request must carry an activated user holding `code`.
    ///
    /// Identity checks come first, so anonymous callers never trigger a
    /// permission lookup. The lookup result is cached in `ctx`.
    pub async fn require_permission(&self, ctx: &RequestContext, code: &str) -> Result<(), AppError> {
        let user = self.require_activated(ctx)?;

        let permissions = ctx
            .permissions
            .get_or_try_init(|| self.db.get_permissions_for_user(user.id))
            .await?;

        if !permissions.includes(code) {
            tracing::debug!(user_id = user.id, code, "Permission denied");
            return Err(AppError::PermissionDenied);
        }
        Ok(())
    }
}
