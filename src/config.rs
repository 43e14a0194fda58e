// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at process start and never changes afterwards.

use std::env;
use std::str::FromStr;
use std::time::Duration;

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Rate limiter settings.
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    /// Tokens refilled per second
    pub rps: f64,
    /// Bucket capacity
    pub burst: u32,
    pub enabled: bool,
    /// How often idle client buckets are swept
    pub cleanup_interval: Duration,
}

impl LimiterConfig {
    /// Buckets idle for longer than this are evicted by the sweep.
    pub fn retention(&self) -> Duration {
        self.cleanup_interval * 3
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Deployment environment name (development|staging|production)
    pub env: String,
    /// sqlx SQLite connection URL
    pub database_url: String,
    /// Upper bound on any single database call
    pub db_query_timeout: Duration,
    pub limiter: LimiterConfig,
    /// Lifetime of authentication-scope tokens
    pub auth_token_ttl: chrono::Duration,
    /// Lifetime of activation-scope tokens
    pub activation_token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    /// Populate demo workouts when the database is empty
    pub seed_demo_data: bool,
}

impl Config {
    /// Config for tests: in-memory database, fast hashing, limiter disabled.
    pub fn test_default() -> Self {
        Self {
            port: 4000,
            env: "test".to_string(),
            database_url: "sqlite::memory:".to_string(),
            db_query_timeout: Duration::from_secs(3),
            limiter: LimiterConfig {
                rps: 2.0,
                burst: 4,
                enabled: false,
                cleanup_interval: Duration::from_secs(60),
            },
            auth_token_ttl: chrono::Duration::hours(24),
            activation_token_ttl: chrono::Duration::hours(72),
            bcrypt_cost: 4,
            seed_demo_data: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let seed_default = env == "development";

        let config = Self {
            port: parse_var("PORT", 4000)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://gotogym.db?mode=rwc".to_string()),
            db_query_timeout: Duration::from_secs(parse_var("DB_QUERY_TIMEOUT_SECS", 3)?),
            limiter: LimiterConfig {
                rps: parse_var("LIMITER_RPS", 2.0)?,
                burst: parse_var("LIMITER_BURST", 4)?,
                enabled: parse_var("LIMITER_ENABLED", true)?,
                cleanup_interval: Duration::from_secs(parse_var(
                    "LIMITER_CLEANUP_INTERVAL_SECS",
                    60,
                )?),
            },
            auth_token_ttl: chrono::Duration::hours(parse_var("AUTH_TOKEN_TTL_HOURS", 24)?),
            activation_token_ttl: chrono::Duration::hours(parse_var(
                "ACTIVATION_TOKEN_TTL_HOURS",
                72,
            )?),
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            seed_demo_data: parse_var("SEED_DEMO_DATA", seed_default)?,
            env,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.limiter.enabled {
            if !(self.limiter.rps > 0.0) {
                return Err(ConfigError::Invalid("LIMITER_RPS", "must be positive"));
            }
            if self.limiter.burst < 1 {
                return Err(ConfigError::Invalid("LIMITER_BURST", "must be at least 1"));
            }
        }
        if self.limiter.cleanup_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "LIMITER_CLEANUP_INTERVAL_SECS",
                "must be at least 1",
            ));
        }
        if self.db_query_timeout.is_zero() {
            return Err(ConfigError::Invalid("DB_QUERY_TIMEOUT_SECS", "must be at least 1"));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST", "must be between 4 and 31"));
        }
        Ok(())
    }
}

/// Read and parse an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, "could not be parsed")),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    Invalid(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("LIMITER_RPS", "5.5");
        env::set_var("LIMITER_BURST", "10");
        env::set_var("BCRYPT_COST", "4");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.limiter.rps, 5.5);
        assert_eq!(config.limiter.burst, 10);
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.limiter.retention(), config.limiter.cleanup_interval * 3);

        env::remove_var("LIMITER_RPS");
        env::remove_var("LIMITER_BURST");
        env::remove_var("BCRYPT_COST");
    }

    #[test]
    fn test_enabled_limiter_requires_positive_rate() {
        let mut config = Config::test_default();
        config.limiter.enabled = true;
        config.limiter.rps = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid("LIMITER_RPS", _))
        ));

        config.limiter.rps = 1.0;
        config.limiter.burst = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid("LIMITER_BURST", _))
        ));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::test_default().validate().is_ok());
    }
}
