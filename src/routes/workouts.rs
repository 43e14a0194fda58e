// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout endpoints.

use super::{list_filters, read_id, MessageResponse};
use crate::db::Versioned;
use crate::error::{FieldErrors, Result};
use crate::filters::{read_csv, read_int, ListParams, Metadata};
use crate::models::{
    CreateWorkout, Exercise, ExerciseFilter, UpdateWorkout, Workout, WorkoutFilter,
};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Routes guarded by `workouts:read`.
pub fn read_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/workouts", get(list_workouts))
        .route("/v1/workouts/{id}", get(show_workout))
        .route("/v1/workouts/{id}/exercises", get(list_workout_exercises))
}

/// Routes guarded by `workouts:write`.
pub fn write_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/workouts", post(create_workout))
        .route(
            "/v1/workouts/{id}",
            patch(update_workout).delete(delete_workout),
        )
}

#[derive(Serialize)]
pub struct WorkoutResponse {
    pub workout: Workout,
}

#[derive(Serialize)]
pub struct WorkoutListResponse {
    pub workouts: Vec<Workout>,
    pub metadata: Metadata,
}

#[derive(Serialize)]
pub struct ExerciseListResponse {
    pub exercises: Vec<Exercise>,
    pub metadata: Metadata,
}

/// Query string for `GET /v1/workouts`.
#[derive(Debug, Default, Deserialize)]
pub struct WorkoutQuery {
    pub name: Option<String>,
    pub exercises: Option<String>,
    pub calories_from: Option<String>,
    pub calories_to: Option<String>,
    #[serde(flatten)]
    pub list: ListParams,
}

/// Query string for `GET /v1/workouts/{id}/exercises`.
#[derive(Debug, Default, Deserialize)]
pub struct ExerciseQuery {
    pub name: Option<String>,
    pub sets_from: Option<String>,
    pub sets_to: Option<String>,
    #[serde(flatten)]
    pub list: ListParams,
}

/// Read a lower or upper bound filter; 0 means unbounded.
fn read_bound(raw: Option<&str>, field: &str, errors: &mut FieldErrors) -> i64 {
    let value = read_int(raw, 0, field, errors);
    if value < 0 {
        errors.insert(field.to_string(), "must be a non-negative value".to_string());
    }
    value
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<WorkoutQuery>, QueryRejection>,
) -> Result<Json<WorkoutListResponse>> {
    let Query(query) = query?;
    let mut errors = FieldErrors::new();
    let filter = WorkoutFilter {
        name: query.name.unwrap_or_default(),
        exercises: read_csv(query.exercises.as_deref()),
        calories_from: read_bound(query.calories_from.as_deref(), "calories_from", &mut errors),
        calories_to: read_bound(query.calories_to.as_deref(), "calories_to", &mut errors),
    };
    let filters = list_filters(&query.list, Workout::SORT_SAFELIST, errors)?;

    let (workouts, metadata) = state.db.workouts().list(&filter, &filters).await?;
    Ok(Json(WorkoutListResponse { workouts, metadata }))
}

async fn show_workout(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<WorkoutResponse>> {
    let id = read_id(path)?;
    let workout = state.db.workouts().get(id).await?;
    Ok(Json(WorkoutResponse { workout }))
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreateWorkout>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(input) = body?;
    let workout = Workout::new(input);
    workout.validate()?;

    let workout = state.db.workouts().insert(&workout).await?;
    tracing::info!(workout_id = workout.id, "Created workout");

    let location = format!("/v1/workouts/{}", workout.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(WorkoutResponse { workout }),
    ))
}

async fn update_workout(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<UpdateWorkout>, JsonRejection>,
) -> Result<Json<WorkoutResponse>> {
    let id = read_id(path)?;
    let Json(patch) = body?;

    let mut workout = state.db.workouts().get(id).await?;
    workout.apply(patch);
    workout.validate()?;

    let workout = state.db.workouts().update(&workout).await?;
    Ok(Json(WorkoutResponse { workout }))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let id = read_id(path)?;
    state.db.workouts().delete(id).await?;
    tracing::info!(workout_id = id, "Deleted workout");
    Ok(MessageResponse::new("workout successfully deleted"))
}

async fn list_workout_exercises(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
    query: std::result::Result<Query<ExerciseQuery>, QueryRejection>,
) -> Result<Json<ExerciseListResponse>> {
    let workout_id = read_id(path)?;
    let Query(query) = query?;
    // 404 for an unknown workout rather than an empty list.
    state.db.workouts().get(workout_id).await?;

    let mut errors = FieldErrors::new();
    let filter = ExerciseFilter {
        workout_id,
        name: query.name.unwrap_or_default(),
        sets_from: read_bound(query.sets_from.as_deref(), "sets_from", &mut errors),
        sets_to: read_bound(query.sets_to.as_deref(), "sets_to", &mut errors),
    };
    let filters = list_filters(&query.list, Exercise::SORT_SAFELIST, errors)?;

    let (exercises, metadata) = state.db.exercises().list(&filter, &filters).await?;
    Ok(Json(ExerciseListResponse {
        exercises,
        metadata,
    }))
}
