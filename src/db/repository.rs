// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generic repository for versioned records.
//!
//! Updates follow optimistic concurrency control: the write is a single
//! compare-and-increment statement,
//!
//! ```sql
//! UPDATE t SET ..., version = version + 1 WHERE id = ? AND version = ? RETURNING *
//! ```
//!
//! and zero affected rows means another writer got there first. That case
//! is reported as [`AppError::EditConflict`], never as a silent overwrite.

use crate::db::{tables, Db};
use crate::error::AppError;
use crate::filters::{compute_metadata, Filters, Metadata};
use crate::models::{Exercise, ExerciseFilter, User, Workout, WorkoutFilter};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{FromRow, QueryBuilder, Row};
use std::marker::PhantomData;

/// Query with positional SQLite arguments.
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A record stored in its own table with an `id` primary key and an
/// integer `version` column starting at 1.
pub trait Versioned: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Singular name used in error messages.
    const KIND: &'static str;
    /// Writable columns, in the order [`Versioned::bind_fields`] binds them.
    const FIELDS: &'static [&'static str];
    /// Columns clients may sort lists by.
    const SORT_SAFELIST: &'static [&'static str];

    type Filter: Send + Sync;

    fn id(&self) -> i64;
    fn version(&self) -> i64;

    /// Bind the values of [`Versioned::FIELDS`].
    fn bind_fields<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;

    /// Append ` AND ...` conditions for `filter`.
    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &Self::Filter);
}

/// Typed access to one versioned table.
pub struct Repository<E> {
    db: Db,
    _entity: PhantomData<E>,
}

impl<E: Versioned> Repository<E> {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    fn not_found(id: i64) -> AppError {
        AppError::NotFound(format!("{} {} not found", E::KIND, id))
    }

    /// Fetch one record by id.
    pub async fn get(&self, id: i64) -> Result<E, AppError> {
        if id < 1 {
            return Err(Self::not_found(id));
        }
        let sql = format!("SELECT * FROM {} WHERE id = ?", E::TABLE);
        let row = self
            .db
            .timed(sqlx::query(&sql).bind(id).fetch_optional(self.db.pool()))
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        Ok(E::from_row(&row)?)
    }

    /// Insert a record, returning it with its assigned id and version 1.
    pub async fn insert(&self, entity: &E) -> Result<E, AppError> {
        let mut conn = self.db.timed(self.db.pool().acquire()).await?;
        self.insert_on(&mut conn, entity).await
    }

    /// [`Repository::insert`] on a given connection, e.g. an open transaction.
    pub async fn insert_on(&self, conn: &mut SqliteConnection, entity: &E) -> Result<E, AppError> {
        let placeholders = vec!["?"; E::FIELDS.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            E::TABLE,
            E::FIELDS.join(", "),
            placeholders
        );
        let row = self
            .db
            .timed(entity.bind_fields(sqlx::query(&sql)).fetch_one(&mut *conn))
            .await?;
        Ok(E::from_row(&row)?)
    }

    /// Compare-and-increment update.
    ///
    /// `entity.version()` is the version the caller last observed. On
    /// success the returned record carries the new version; when no row
    /// matched, the caller gets [`AppError::EditConflict`].
    pub async fn update(&self, entity: &E) -> Result<E, AppError> {
        let assignments = E::FIELDS
            .iter()
            .map(|field| format!("{field} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {}, version = version + 1 WHERE id = ? AND version = ? RETURNING *",
            E::TABLE,
            assignments
        );
        let query = entity
            .bind_fields(sqlx::query(&sql))
            .bind(entity.id())
            .bind(entity.version());

        match self.db.timed(query.fetch_optional(self.db.pool())).await? {
            Some(row) => Ok(E::from_row(&row)?),
            None => {
                tracing::debug!(
                    kind = E::KIND,
                    id = entity.id(),
                    expected_version = entity.version(),
                    "Edit conflict"
                );
                Err(AppError::EditConflict)
            }
        }
    }

    /// Delete by id.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if id < 1 {
            return Err(Self::not_found(id));
        }
        let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
        let result = self
            .db
            .timed(sqlx::query(&sql).bind(id).execute(self.db.pool()))
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    /// One page of records plus pagination metadata.
    ///
    /// The total count comes from a window function in the same statement,
    /// so no second query is issued.
    pub async fn list(
        &self,
        filter: &E::Filter,
        filters: &Filters,
    ) -> Result<(Vec<E>, Metadata), AppError> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT *, count(*) OVER() AS total_records FROM {} WHERE 1 = 1",
            E::TABLE
        ));
        E::push_filter(&mut builder, filter);
        // Column comes from the safelist, never from the request.
        builder.push(format_args!(
            " ORDER BY {} {}, id ASC LIMIT ",
            filters.sort.column,
            filters.sort.direction()
        ));
        builder.push_bind(filters.limit());
        builder.push(" OFFSET ");
        builder.push_bind(filters.offset());

        let rows = self
            .db
            .timed(builder.build().fetch_all(self.db.pool()))
            .await?;

        let mut total_records = 0;
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            total_records = row.try_get::<i64, _>("total_records")?;
            records.push(E::from_row(row)?);
        }

        Ok((
            records,
            compute_metadata(total_records, filters.page, filters.page_size),
        ))
    }
}

/// `LIKE` pattern matching `raw` as a literal substring, escaped with `\`.
fn like_substring(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len() + 2);
    pattern.push('%');
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Versioned for Workout {
    const TABLE: &'static str = tables::WORKOUTS;
    const KIND: &'static str = "workout";
    const FIELDS: &'static [&'static str] = &["name", "description", "exercises", "calories_burned"];
    const SORT_SAFELIST: &'static [&'static str] = &["id", "name", "calories_burned"];

    type Filter = WorkoutFilter;

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn bind_fields<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(&self.description)
            .bind(sqlx::types::Json(&self.exercises))
            .bind(self.calories_burned)
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &WorkoutFilter) {
        if !filter.name.is_empty() {
            builder.push(" AND name LIKE ");
            builder.push_bind(like_substring(&filter.name));
            builder.push(" ESCAPE '\\'");
        }
        for exercise in &filter.exercises {
            builder.push(" AND EXISTS (SELECT 1 FROM json_each(exercises) WHERE value = ");
            builder.push_bind(exercise.clone());
            builder.push(")");
        }
        if filter.calories_from > 0 {
            builder.push(" AND calories_burned >= ");
            builder.push_bind(filter.calories_from);
        }
        if filter.calories_to > 0 {
            builder.push(" AND calories_burned <= ");
            builder.push_bind(filter.calories_to);
        }
    }
}

impl Versioned for Exercise {
    const TABLE: &'static str = tables::EXERCISES;
    const KIND: &'static str = "exercise";
    const FIELDS: &'static [&'static str] = &["name", "sets", "reps", "workout_id"];
    const SORT_SAFELIST: &'static [&'static str] = &["id", "name", "sets", "reps"];

    type Filter = ExerciseFilter;

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn bind_fields<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.sets)
            .bind(self.reps)
            .bind(self.workout_id)
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ExerciseFilter) {
        builder.push(" AND workout_id = ");
        builder.push_bind(filter.workout_id);
        if !filter.name.is_empty() {
            builder.push(" AND name LIKE ");
            builder.push_bind(like_substring(&filter.name));
            builder.push(" ESCAPE '\\'");
        }
        if filter.sets_from > 0 {
            builder.push(" AND sets >= ");
            builder.push_bind(filter.sets_from);
        }
        if filter.sets_to > 0 {
            builder.push(" AND sets <= ");
            builder.push_bind(filter.sets_to);
        }
    }
}

impl Versioned for User {
    const TABLE: &'static str = tables::USERS;
    const KIND: &'static str = "user";
    const FIELDS: &'static [&'static str] = &["name", "email", "password_hash", "activated"];
    const SORT_SAFELIST: &'static [&'static str] = &["id", "name", "email"];

    type Filter = ();

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn bind_fields<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(self.activated)
    }

    fn push_filter(_builder: &mut QueryBuilder<'_, Sqlite>, _filter: &()) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{parse_filters, ListParams};
    use crate::models::workout::{CreateWorkout, UpdateWorkout};

    fn legs() -> Workout {
        Workout::new(CreateWorkout {
            name: "Legs".to_string(),
            description: "Legs + Arms program".to_string(),
            exercises: vec!["Squats".to_string(), "Lunges".to_string()],
            calories_burned: 520,
        })
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_version() {
        let db = Db::in_memory().await.unwrap();
        let workout = db.workouts().insert(&legs()).await.unwrap();
        assert!(workout.id > 0);
        assert_eq!(workout.version, 1);
        assert_eq!(workout.exercises, vec!["Squats", "Lunges"]);

        let fetched = db.workouts().get(workout.id).await.unwrap();
        assert_eq!(fetched.name, "Legs");
    }

    #[tokio::test]
    async fn test_update_increments_version() {
        let db = Db::in_memory().await.unwrap();
        let repo = db.workouts();
        let mut workout = repo.insert(&legs()).await.unwrap();
        workout.apply(UpdateWorkout {
            version: 1,
            name: Some("Leg Day".to_string()),
            description: None,
            exercises: None,
            calories_burned: None,
        });

        let updated = repo.update(&workout).await.unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.name, "Leg Day");

        // Writing again with the stale version is a conflict.
        let err = repo.update(&workout).await.unwrap_err();
        assert!(matches!(err, AppError::EditConflict));
        assert_eq!(repo.get(workout.id).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = Db::in_memory().await.unwrap();
        assert!(matches!(
            db.workouts().delete(42).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            db.workouts().get(0).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_counts() {
        let db = Db::in_memory().await.unwrap();
        let repo = db.workouts();
        for i in 0..25 {
            let mut workout = legs();
            workout.name = format!("Workout {i:02}");
            workout.calories_burned = i * 10;
            if i % 2 == 0 {
                workout.exercises.push("Deadlifts".to_string());
            }
            repo.insert(&workout).await.unwrap();
        }

        let params = ListParams {
            page: Some("2".to_string()),
            page_size: Some("5".to_string()),
            sort: Some("-calories_burned".to_string()),
        };
        let filters = parse_filters(&params, Workout::SORT_SAFELIST).unwrap();
        let filter = WorkoutFilter {
            exercises: vec!["Deadlifts".to_string()],
            ..Default::default()
        };

        let (page, metadata) = repo.list(&filter, &filters).await.unwrap();
        // 13 even-numbered workouts carry Deadlifts.
        assert_eq!(metadata.total_records, 13);
        assert_eq!(metadata.last_page, 3);
        assert_eq!(metadata.current_page, 2);
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].calories_burned, 140);
        assert!(page.windows(2).all(|w| w[0].calories_burned >= w[1].calories_burned));
    }

    #[tokio::test]
    async fn test_list_past_last_page_is_empty() {
        let db = Db::in_memory().await.unwrap();
        db.workouts().insert(&legs()).await.unwrap();

        let params = ListParams {
            page: Some("5".to_string()),
            ..Default::default()
        };
        let filters = parse_filters(&params, Workout::SORT_SAFELIST).unwrap();
        let (page, metadata) = db
            .workouts()
            .list(&WorkoutFilter::default(), &filters)
            .await
            .unwrap();
        assert!(page.is_empty());
        assert_eq!(metadata, Metadata::default());
    }

    #[tokio::test]
    async fn test_name_filter_treats_wildcards_literally() {
        let db = Db::in_memory().await.unwrap();
        let repo = db.workouts();
        for name in ["Legs", "Arms", "100% Cardio", "Push_Pull", "Back\\Chest"] {
            let mut workout = legs();
            workout.name = name.to_string();
            repo.insert(&workout).await.unwrap();
        }
        let filters = parse_filters(&ListParams::default(), Workout::SORT_SAFELIST).unwrap();

        for (needle, expected) in [
            ("%", vec!["100% Cardio"]),
            ("_", vec!["Push_Pull"]),
            ("\\", vec!["Back\\Chest"]),
            ("a_m", vec![]),
            ("ARM", vec!["Arms"]),
        ] {
            let filter = WorkoutFilter {
                name: needle.to_string(),
                ..Default::default()
            };
            let (page, metadata) = repo.list(&filter, &filters).await.unwrap();
            let names: Vec<_> = page.iter().map(|w| w.name.as_str()).collect();
            assert_eq!(names, expected, "{needle}");
            assert_eq!(metadata.total_records, expected.len() as i64);
        }
    }

    #[test]
    fn test_like_substring_escapes() {
        assert_eq!(like_substring("leg"), "%leg%");
        assert_eq!(like_substring("5%_a\\b"), "%5\\%\\_a\\\\b%");
    }
}
