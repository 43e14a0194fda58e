// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod exercise;
pub mod token;
pub mod user;
pub mod workout;

pub use exercise::{CreateExercise, Exercise, ExerciseFilter, UpdateExercise};
pub use token::{IssuedToken, Scope};
pub use user::{ActivateUser, Credentials, Identity, Permissions, RegisterUser, User};
pub use workout::{CreateWorkout, UpdateWorkout, Workout, WorkoutFilter};
