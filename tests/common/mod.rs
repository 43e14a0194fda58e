// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use gotogym::config::Config;
use gotogym::db::Db;
use gotogym::models::{Scope, User};
use gotogym::routes::create_router;
use gotogym::services::password;
use gotogym::AppState;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

/// Password used for every test user.
#[allow(dead_code)]
pub const PASSWORD: &str = "pa55word!";

/// Create a test app over a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(Config::test_default()).await
}

/// Same as [`create_test_app`] with a custom configuration.
#[allow(dead_code)]
pub async fn create_test_app_with(config: Config) -> (Router, Arc<AppState>) {
    let db = Db::in_memory().await.expect("Failed to open test database");
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Insert a user with the given activation state and permission codes.
#[allow(dead_code)]
pub async fn create_user(
    state: &AppState,
    email: &str,
    activated: bool,
    permissions: &[&str],
) -> User {
    let user = User {
        id: 0,
        created_at: chrono::Utc::now(),
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: password::hash(PASSWORD, 4).await.unwrap(),
        activated,
        version: 1,
    };
    let user = state.db.users().insert(&user).await.unwrap();
    state
        .db
        .add_permissions_for_user(user.id, permissions)
        .await
        .unwrap();
    user
}

/// Issue an authentication token for `user`.
#[allow(dead_code)]
pub async fn auth_token(state: &AppState, user: &User) -> String {
    state
        .tokens
        .issue(user.id, chrono::Duration::hours(1), Scope::Authentication)
        .await
        .unwrap()
        .token
}

/// Activated user with read and write access, plus a bearer token.
#[allow(dead_code)]
pub async fn writer(state: &AppState) -> String {
    let user = create_user(
        state,
        "writer@example.com",
        true,
        &["workouts:read", "workouts:write"],
    )
    .await;
    auth_token(state, &user).await
}

/// Build a request as if it arrived from 127.0.0.1.
#[allow(dead_code)]
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    request_from([127, 0, 0, 1], method, uri, token, body)
}

/// Build a request as if it arrived from `ip`.
#[allow(dead_code)]
pub fn request_from(
    ip: [u8; 4],
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let mut request = builder.body(body).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 40000))));
    request
}

/// Send a request and decode the JSON body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

/// Create a workout through the API, returning its JSON.
#[allow(dead_code)]
pub async fn create_workout(app: &Router, token: &str, name: &str, calories: i64) -> Value {
    let (status, _, body) = send(
        app,
        request(
            Method::POST,
            "/v1/workouts",
            Some(token),
            Some(serde_json::json!({
                "name": name,
                "description": "test",
                "exercises": ["Squats", "Lunges"],
                "calories_burned": calories,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["workout"].clone()
}
