// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite via sqlx).
//!
//! Every statement runs through [`Db::timed`], so a stuck database surfaces
//! as [`AppError::Timeout`] instead of hanging the request.

pub mod permissions;
pub mod repository;
pub mod seed;
pub mod tokens;
pub mod users;

pub use repository::{Repository, Versioned};

use crate::error::AppError;
use crate::models::{Exercise, User, Workout};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

/// Table names as constants.
pub mod tables {
    pub const USERS: &str = "users";
    pub const TOKENS: &str = "tokens";
    pub const PERMISSIONS: &str = "permissions";
    pub const USERS_PERMISSIONS: &str = "users_permissions";
    pub const WORKOUTS: &str = "workouts";
    pub const EXERCISES: &str = "exercises";
}

/// Database handle. Cheap to clone.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl Db {
    /// Connect to the database at `url`.
    pub async fn connect(url: &str, query_timeout: Duration) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?.foreign_keys(true);

        // An in-memory database lives and dies with its connection, so it
        // must be pinned to exactly one.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .acquire_timeout(query_timeout)
                .connect_with(options)
                .await?
        };

        tracing::info!(url, "Connected to database");

        Ok(Self {
            pool,
            query_timeout,
        })
    }

    /// Fresh, migrated in-memory database.
    pub async fn in_memory() -> Result<Self, AppError> {
        let db = Self::connect("sqlite::memory:", Duration::from_secs(3)).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Apply embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a database future under the per-call timeout.
    pub async fn timed<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::Timeout),
        }
    }

    pub fn workouts(&self) -> Repository<Workout> {
        Repository::new(self.clone())
    }

    pub fn exercises(&self) -> Repository<Exercise> {
        Repository::new(self.clone())
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.clone())
    }
}
