// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token rows. Only hashes are ever written.

use crate::db::{tables, Db};
use crate::error::AppError;
use crate::models::Scope;
use sqlx::SqliteConnection;

impl Db {
    /// Persist a token hash.
    pub async fn insert_token(
        &self,
        token_hash: &[u8],
        user_id: i64,
        expiry: i64,
        scope: Scope,
    ) -> Result<(), AppError> {
        let mut conn = self.timed(self.pool().acquire()).await?;
        self.insert_token_on(&mut conn, token_hash, user_id, expiry, scope)
            .await
    }

    /// [`Db::insert_token`] on a given connection.
    pub async fn insert_token_on(
        &self,
        conn: &mut SqliteConnection,
        token_hash: &[u8],
        user_id: i64,
        expiry: i64,
        scope: Scope,
    ) -> Result<(), AppError> {
        let sql = format!(
            "INSERT INTO {} (hash, user_id, expiry, scope) VALUES (?, ?, ?, ?)",
            tables::TOKENS
        );
        self.timed(
            sqlx::query(&sql)
                .bind(token_hash)
                .bind(user_id)
                .bind(expiry)
                .bind(scope.as_str())
                .execute(&mut *conn),
        )
        .await?;
        Ok(())
    }

    /// Delete every token of `scope` owned by `user_id`. Returns how many went.
    pub async fn delete_tokens_for_user(&self, scope: Scope, user_id: i64) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {} WHERE scope = ? AND user_id = ?", tables::TOKENS);
        let result = self
            .timed(
                sqlx::query(&sql)
                    .bind(scope.as_str())
                    .bind(user_id)
                    .execute(self.pool()),
            )
            .await?;
        Ok(result.rows_affected())
    }
}
