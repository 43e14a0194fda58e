// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid authentication credentials")]
    InvalidCredentials,

    #[error("Invalid or malformed Authorization header")]
    InvalidAuthHeader,

    #[error("Account must be activated")]
    InactiveAccount,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Edit conflict")]
    EditConflict,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Database call timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Validation error for a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        AppError::Validation(errors)
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationRequired
            | AppError::InvalidCredentials
            | AppError::InvalidAuthHeader => StatusCode::UNAUTHORIZED,
            AppError::InactiveAccount | AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EditConflict => StatusCode::CONFLICT,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .unwrap_or_else(|| "is invalid".to_string());
                (field.to_string(), message)
            })
            .collect();
        AppError::Validation(fields)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound("the requested resource could not be found".to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details, fields) = match self {
            AppError::Validation(fields) => ("failed_validation", None, Some(fields)),
            AppError::BadRequest(msg) => ("bad_request", Some(msg), None),
            AppError::AuthenticationRequired => (
                "authentication_required",
                Some("you must be authenticated to access this resource".to_string()),
                None,
            ),
            AppError::InvalidCredentials => (
                "invalid_credentials",
                Some("invalid or expired authentication credentials".to_string()),
                None,
            ),
            AppError::InvalidAuthHeader => (
                "invalid_auth_header",
                Some("expected an 'Authorization: Bearer <token>' header".to_string()),
                None,
            ),
            AppError::InactiveAccount => (
                "inactive_account",
                Some("your user account must be activated to access this resource".to_string()),
                None,
            ),
            AppError::PermissionDenied => (
                "permission_denied",
                Some("your user account doesn't have the necessary permissions".to_string()),
                None,
            ),
            AppError::NotFound(msg) => ("not_found", Some(msg), None),
            AppError::EditConflict => (
                "edit_conflict",
                Some("unable to update the record due to an edit conflict, please try again".to_string()),
                None,
            ),
            AppError::RateLimited => ("rate_limit_exceeded", None, None),
            AppError::Timeout => {
                tracing::error!("Database call timed out");
                ("timeout", None, None)
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                ("database_error", None, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None, None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            fields,
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::invalid_field("page", "must be greater than zero").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidAuthHeader.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InactiveAccount.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::PermissionDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::EditConflict.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_unauthorized_sets_www_authenticate() {
        let response = AppError::AuthenticationRequired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[tokio::test]
    async fn test_query_rejection_is_json_bad_request() {
        use axum::extract::{FromRequestParts, Query};
        use std::collections::HashMap;

        let (mut parts, _) = axum::http::Request::builder()
            .uri("/v1/workouts?page=abc")
            .body(())
            .unwrap()
            .into_parts();
        let rejection = Query::<HashMap<String, i64>>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        let err = AppError::from(rejection);
        assert!(matches!(err, AppError::BadRequest(_)));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_internal_error_is_opaque() {
        let response = AppError::Internal(anyhow::anyhow!("secret connection string")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
