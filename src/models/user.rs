//! User model and request identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Registered user account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub activated: bool,
    #[serde(skip)]
    pub version: i64,
}

/// Who is making the current request.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    /// No credentials were presented.
    #[default]
    Anonymous,
    User(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }
}

/// Permission codes granted to a user, e.g. `workouts:read`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions(HashSet<String>);

impl Permissions {
    pub fn includes(&self, code: &str) -> bool {
        self.0.contains(code)
    }
}

impl FromIterator<String> for Permissions {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// bcrypt only reads the first 72 bytes, so the bound is on bytes, not chars.
fn password_length(password: &str) -> Result<(), ValidationError> {
    if (8..=72).contains(&password.len()) {
        Ok(())
    } else {
        Err(ValidationError::new("length")
            .with_message(Cow::Borrowed("must be between 8 and 72 bytes long")))
    }
}

/// Registration request body.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 500, message = "must be between 1 and 500 characters long"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(custom(function = "password_length"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(custom(function = "password_length"))]
    pub password: String,
}

/// Activation request body.
#[derive(Debug, Deserialize)]
pub struct ActivateUser {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: String) -> RegisterUser {
        RegisterUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password,
        }
    }

    #[test]
    fn test_password_length_counts_bytes() {
        assert!(register("pa55word".to_string()).validate().is_ok());
        assert!(register("a".repeat(72)).validate().is_ok());
        assert!(register("a".repeat(73)).validate().is_err());
        assert!(register("a".repeat(7)).validate().is_err());

        // 72 chars but 144 bytes.
        let errors = register("é".repeat(72)).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
        assert!(register("é".repeat(36)).validate().is_ok());
    }

    #[test]
    fn test_login_password_counts_bytes() {
        let credentials = Credentials {
            email: "alice@example.com".to_string(),
            password: "é".repeat(40),
        };
        assert!(credentials.validate().is_err());
    }
}
