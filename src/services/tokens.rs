// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token issue, lookup and revocation.
//!
//! A token is 16 bytes from the system CSPRNG, handed to the client as
//! unpadded base64url. Only the SHA-256 of that text is stored, so a
//! database dump never yields usable credentials.

use crate::db::Db;
use crate::error::AppError;
use crate::models::{IssuedToken, Scope, User};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

/// Random bytes per token.
pub const TOKEN_BYTES: usize = 16;

/// Length of the encoded plaintext.
pub const TOKEN_LENGTH: usize = 22;

/// A freshly generated token that has not been stored yet.
pub struct MintedToken {
    pub token: String,
    pub hash: Vec<u8>,
    pub expiry: DateTime<Utc>,
}

impl MintedToken {
    /// The client-facing token once stored for `user_id`.
    pub fn issued(self, user_id: i64, scope: Scope) -> IssuedToken {
        IssuedToken {
            token: self.token,
            expiry: self.expiry,
            user_id,
            scope,
        }
    }
}

/// Issues and resolves scoped bearer tokens.
#[derive(Clone)]
pub struct TokenStore {
    db: Db,
    rng: SystemRandom,
}

impl TokenStore {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            rng: SystemRandom::new(),
        }
    }

    /// Fresh random plaintext.
    pub fn generate(&self) -> Result<String, AppError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// One-way hash of a plaintext token, as stored.
    pub fn hash(plaintext: &str) -> Vec<u8> {
        Sha256::digest(plaintext.as_bytes()).to_vec()
    }

    /// Whether `plaintext` has the shape of a token we could have issued.
    pub fn is_well_formed(plaintext: &str) -> bool {
        plaintext.len() == TOKEN_LENGTH
            && URL_SAFE_NO_PAD
                .decode(plaintext)
                .is_ok_and(|bytes| bytes.len() == TOKEN_BYTES)
    }

    /// Mint a token without storing it. The caller persists `hash` and
    /// `expiry`, typically alongside other writes in one transaction.
    pub fn mint(&self, ttl: Duration) -> Result<MintedToken, AppError> {
        let token = self.generate()?;
        Ok(MintedToken {
            hash: Self::hash(&token),
            expiry: Utc::now() + ttl,
            token,
        })
    }

    /// Issue a token for `user_id`. The plaintext is only ever returned here.
    pub async fn issue(
        &self,
        user_id: i64,
        ttl: Duration,
        scope: Scope,
    ) -> Result<IssuedToken, AppError> {
        let minted = self.mint(ttl)?;

        self.db
            .insert_token(&minted.hash, user_id, minted.expiry.timestamp(), scope)
            .await?;

        tracing::debug!(user_id, scope = scope.as_str(), "Issued token");

        Ok(minted.issued(user_id, scope))
    }

    /// Owner of an unexpired token. Unknown, expired and malformed tokens all
    /// come back as `None`.
    pub async fn user_for_token(
        &self,
        scope: Scope,
        plaintext: &str,
    ) -> Result<Option<User>, AppError> {
        if !Self::is_well_formed(plaintext) {
            return Ok(None);
        }
        self.db
            .get_user_for_token(scope, &Self::hash(plaintext), Utc::now().timestamp())
            .await
    }

    /// Delete every token of `scope` held by `user_id`.
    pub async fn revoke(&self, user_id: i64, scope: Scope) -> Result<u64, AppError> {
        let revoked = self.db.delete_tokens_for_user(scope, user_id).await?;
        tracing::debug!(user_id, scope = scope.as_str(), revoked, "Revoked tokens");
        Ok(revoked)
    }
}
