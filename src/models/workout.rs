// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A workout program. Versioned: every update bumps `version` by one.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, Validate)]
pub struct Workout {
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters long"))]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Exercise names, stored as a JSON array
    #[sqlx(json)]
    #[validate(length(min = 1, message = "at least one exercise must be provided"))]
    pub exercises: Vec<String>,
    #[validate(range(min = 0, message = "must be a non-negative value"))]
    pub calories_burned: i64,
    pub version: i64,
}

/// List filters specific to workouts. Zero bounds are ignored.
#[derive(Debug, Default, Clone)]
pub struct WorkoutFilter {
    pub name: String,
    /// Every listed exercise must be present in the workout
    pub exercises: Vec<String>,
    pub calories_from: i64,
    pub calories_to: i64,
}

/// Request body for creating a workout.
#[derive(Debug, Deserialize)]
pub struct CreateWorkout {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<String>,
    #[serde(default)]
    pub calories_burned: i64,
}

/// Partial update. `version` is the version the client last observed.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkout {
    pub version: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub exercises: Option<Vec<String>>,
    pub calories_burned: Option<i64>,
}

impl Workout {
    pub fn new(input: CreateWorkout) -> Self {
        Self {
            id: 0,
            created_at: Utc::now(),
            name: input.name,
            description: input.description,
            exercises: input.exercises,
            calories_burned: input.calories_burned,
            version: 1,
        }
    }

    /// Apply the fields present in `patch`, and take the client's observed
    /// version so the update compares against it.
    pub fn apply(&mut self, patch: UpdateWorkout) {
        self.version = patch.version;
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(exercises) = patch.exercises {
            self.exercises = exercises;
        }
        if let Some(calories_burned) = patch.calories_burned {
            self.calories_burned = calories_burned;
        }
    }
}
