// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise endpoints. Listing lives under `/v1/workouts/{id}/exercises`.

use super::{read_id, MessageResponse};
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{CreateExercise, Exercise, UpdateExercise};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

/// Routes guarded by `workouts:read`.
pub fn read_routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/exercises/{id}", get(show_exercise))
}

/// Routes guarded by `workouts:write`.
pub fn write_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/exercises", post(create_exercise))
        .route(
            "/v1/exercises/{id}",
            patch(update_exercise).delete(delete_exercise),
        )
}

#[derive(Serialize)]
pub struct ExerciseResponse {
    pub exercise: Exercise,
}

/// Validate an exercise, including that its workout exists.
async fn validate_exercise(db: &Db, exercise: &Exercise) -> Result<()> {
    exercise.validate()?;
    match db.workouts().get(exercise.workout_id).await {
        Ok(_) => Ok(()),
        Err(AppError::NotFound(_)) => Err(AppError::invalid_field(
            "workout_id",
            "must reference an existing workout",
        )),
        Err(err) => Err(err),
    }
}

async fn show_exercise(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<ExerciseResponse>> {
    let id = read_id(path)?;
    let exercise = state.db.exercises().get(id).await?;
    Ok(Json(ExerciseResponse { exercise }))
}

async fn create_exercise(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreateExercise>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(input) = body?;
    let exercise = Exercise::new(input);
    validate_exercise(&state.db, &exercise).await?;

    let exercise = state.db.exercises().insert(&exercise).await?;
    tracing::info!(
        exercise_id = exercise.id,
        workout_id = exercise.workout_id,
        "Created exercise"
    );

    let location = format!("/v1/exercises/{}", exercise.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ExerciseResponse { exercise }),
    ))
}

async fn update_exercise(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<UpdateExercise>, JsonRejection>,
) -> Result<Json<ExerciseResponse>> {
    let id = read_id(path)?;
    let Json(patch) = body?;

    let mut exercise = state.db.exercises().get(id).await?;
    exercise.apply(patch);
    validate_exercise(&state.db, &exercise).await?;

    let exercise = state.db.exercises().update(&exercise).await?;
    Ok(Json(ExerciseResponse { exercise }))
}

async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let id = read_id(path)?;
    state.db.exercises().delete(id).await?;
    tracing::info!(exercise_id = id, "Deleted exercise");
    Ok(MessageResponse::new("exercise successfully deleted"))
}
