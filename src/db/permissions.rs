// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User <-> permission code relation.

use crate::db::{tables, Db};
use crate::error::AppError;
use crate::models::Permissions;
use sqlx::SqliteConnection;

impl Db {
    /// All permission codes granted to a user.
    pub async fn get_permissions_for_user(&self, user_id: i64) -> Result<Permissions, AppError> {
        let sql = format!(
            "SELECT p.code FROM {permissions} p \
             INNER JOIN {users_permissions} up ON up.permission_id = p.id \
             WHERE up.user_id = ?",
            permissions = tables::PERMISSIONS,
            users_permissions = tables::USERS_PERMISSIONS,
        );
        let codes: Vec<String> = self
            .timed(
                sqlx::query_scalar(&sql)
                    .bind(user_id)
                    .fetch_all(self.pool()),
            )
            .await?;
        Ok(codes.into_iter().collect())
    }

    /// Grant permission codes to a user. Unknown codes and existing grants are ignored.
    pub async fn add_permissions_for_user(
        &self,
        user_id: i64,
        codes: &[&str],
    ) -> Result<(), AppError> {
        let mut conn = self.timed(self.pool().acquire()).await?;
        self.add_permissions_on(&mut conn, user_id, codes).await
    }

    /// [`Db::add_permissions_for_user`] on a given connection.
    pub async fn add_permissions_on(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        codes: &[&str],
    ) -> Result<(), AppError> {
        let sql = format!(
            "INSERT OR IGNORE INTO {users_permissions} (user_id, permission_id) \
             SELECT ?, id FROM {permissions} WHERE code = ?",
            permissions = tables::PERMISSIONS,
            users_permissions = tables::USERS_PERMISSIONS,
        );
        for code in codes {
            self.timed(
                sqlx::query(&sql)
                    .bind(user_id)
                    .bind(*code)
                    .execute(&mut *conn),
            )
            .await?;
        }
        Ok(())
    }
}
