// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User lookups beyond the generic repository.

use crate::db::{tables, Db};
use crate::error::AppError;
use crate::models::{Scope, User};

impl Db {
    /// Get a user by email (case-insensitive).
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT * FROM {} WHERE email = ?", tables::USERS);
        self.timed(
            sqlx::query_as::<_, User>(&sql)
                .bind(email)
                .fetch_optional(self.pool()),
        )
        .await
    }

    /// Create an account with its initial grants and activation token in one
    /// transaction. Nothing is written unless all three succeed.
    pub async fn register_user(
        &self,
        user: &User,
        codes: &[&str],
        activation_hash: &[u8],
        activation_expiry: i64,
    ) -> Result<User, AppError> {
        let mut tx = self.timed(self.pool().begin()).await?;

        let user = self.users().insert_on(&mut tx, user).await?;
        self.add_permissions_on(&mut tx, user.id, codes).await?;
        self.insert_token_on(
            &mut tx,
            activation_hash,
            user.id,
            activation_expiry,
            Scope::Activation,
        )
        .await?;

        self.timed(tx.commit()).await?;
        Ok(user)
    }

    /// Resolve the owner of an unexpired token with the given hash and scope.
    ///
    /// Unknown and expired tokens are indistinguishable to the caller.
    pub async fn get_user_for_token(
        &self,
        scope: Scope,
        token_hash: &[u8],
        now: i64,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT u.* FROM {users} u \
             INNER JOIN {tokens} t ON u.id = t.user_id \
             WHERE t.hash = ? AND t.scope = ? AND t.expiry > ?",
            users = tables::USERS,
            tokens = tables::TOKENS,
        );
        self.timed(
            sqlx::query_as::<_, User>(&sql)
                .bind(token_hash)
                .bind(scope.as_str())
                .bind(now)
                .fetch_optional(self.pool()),
        )
        .await
    }
}
