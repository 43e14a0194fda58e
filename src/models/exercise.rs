// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single exercise belonging to a workout. Versioned like `Workout`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, Validate)]
pub struct Exercise {
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters long"))]
    pub name: String,
    #[validate(range(min = 0, message = "must be a non-negative value"))]
    pub sets: i64,
    #[validate(range(min = 0, message = "must be a non-negative value"))]
    pub reps: i64,
    #[validate(range(min = 1, message = "must be provided"))]
    pub workout_id: i64,
    pub version: i64,
}

/// List filters for the exercises of one workout. Zero bounds are ignored.
#[derive(Debug, Default, Clone)]
pub struct ExerciseFilter {
    pub workout_id: i64,
    pub name: String,
    pub sets_from: i64,
    pub sets_to: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateExercise {
    pub name: String,
    #[serde(default)]
    pub sets: i64,
    #[serde(default)]
    pub reps: i64,
    #[serde(default)]
    pub workout_id: i64,
}

/// Partial update. `version` is the version the client last observed.
#[derive(Debug, Deserialize)]
pub struct UpdateExercise {
    pub version: i64,
    pub name: Option<String>,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub workout_id: Option<i64>,
}

impl Exercise {
    pub fn new(input: CreateExercise) -> Self {
        Self {
            id: 0,
            created_at: Utc::now(),
            name: input.name,
            sets: input.sets,
            reps: input.reps,
            workout_id: input.workout_id,
            version: 1,
        }
    }

    /// Apply the fields present in `patch`, including the observed version.
    pub fn apply(&mut self, patch: UpdateExercise) {
        self.version = patch.version;
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(sets) = patch.sets {
            self.sets = sets;
        }
        if let Some(reps) = patch.reps {
            self.reps = reps;
        }
        if let Some(workout_id) = patch.workout_id {
            self.workout_id = workout_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_validation() {
        let mut exercise = Exercise::new(CreateExercise {
            name: "Squats".to_string(),
            sets: 3,
            reps: 5,
            workout_id: 1,
        });
        assert!(exercise.validate().is_ok());

        exercise.sets = -1;
        exercise.workout_id = 0;
        let errors = exercise.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sets"));
        assert!(errors.field_errors().contains_key("workout_id"));
    }
}
