// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! bcrypt password hashing, run off the async executor.

use crate::error::AppError;
use anyhow::Context;

/// Hash `password` at the given bcrypt cost.
pub async fn hash(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("Password hashing failed")?;
    Ok(hashed)
}

/// Check `password` against a stored hash.
pub async fn verify(password: &str, hashed: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let hashed = hashed.to_string();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed))
        .await
        .context("Password verification task failed")?
        .context("Password verification failed")?;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hashed = hash("pa55word", 4).await.unwrap();
        assert_ne!(hashed, "pa55word");
        assert!(verify("pa55word", &hashed).await.unwrap());
        assert!(!verify("pa55wordx", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal_error() {
        let err = verify("pa55word", "not-a-bcrypt-hash").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
