// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo data for an empty database.

use crate::db::{tables, Db};
use crate::error::AppError;
use crate::models::exercise::CreateExercise;
use crate::models::workout::CreateWorkout;
use crate::models::{Exercise, Workout};

const DEMO_WORKOUTS: &[(&str, &str, &[&str], i64)] = &[
    ("Legs", "Legs + Arms program", &["Squats", "Lunges", "Leg Press", "Bicep Curls", "Dips", "Shoulder Press"], 520),
    ("Chest", "Chest + Core program", &["Bench Press", "Push-ups", "Dumbbell Flyes", "Planks", "Russian Twists", "Leg Raises"], 400),
    ("Back", "Back Day program", &["Deadlifts", "Pull-ups", "Rows"], 250),
    ("Cardio", "Cardio Workout program", &["Running", "Cycling", "Jumping Jacks"], 300),
    ("Full Body", "Full Body Workout program", &["Squats", "Push-ups", "Pull-ups", "Planks"], 350),
];

/// (sets, reps) for each exercise name of the matching demo workout.
const DEMO_VOLUME: &[&[(i64, i64)]] = &[
    &[(3, 5), (2, 12), (4, 12), (3, 12), (3, 10), (2, 20)],
    &[(4, 8), (3, 15), (3, 12), (3, 60), (3, 20), (3, 15)],
    &[(4, 6), (3, 10), (3, 12)],
    &[(1, 30), (1, 30), (1, 60)],
    &[(3, 10), (3, 20), (3, 10), (3, 60)],
];

/// Insert demo workouts and exercises if the workouts table is empty.
/// Returns whether anything was written.
pub async fn populate_if_empty(db: &Db) -> Result<bool, AppError> {
    let sql = format!("SELECT count(*) FROM {}", tables::WORKOUTS);
    let count: i64 = db
        .timed(sqlx::query_scalar(&sql).fetch_one(db.pool()))
        .await?;
    if count > 0 {
        return Ok(false);
    }

    for ((name, description, exercises, calories), volume) in
        DEMO_WORKOUTS.iter().zip(DEMO_VOLUME)
    {
        let workout = db
            .workouts()
            .insert(&Workout::new(CreateWorkout {
                name: name.to_string(),
                description: description.to_string(),
                exercises: exercises.iter().map(|e| e.to_string()).collect(),
                calories_burned: *calories,
            }))
            .await?;

        for (exercise, (sets, reps)) in exercises.iter().zip(volume.iter()) {
            db.exercises()
                .insert(&Exercise::new(CreateExercise {
                    name: exercise.to_string(),
                    sets: *sets,
                    reps: *reps,
                    workout_id: workout.id,
                }))
                .await?;
        }
    }

    tracing::info!(workouts = DEMO_WORKOUTS.len(), "Database filled with demo data");
    Ok(true)
}
