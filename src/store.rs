//! SQLite persistence for per-user documents
//!
//! Plans, program templates and workout snapshots are stored as JSON
//! documents and always written whole. Tracking logs are plain rows.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use thiserror::Error;

use crate::models::{
  CheckIn, MacroPlan, MacroTotals, MealEntry, NewCheckIn, NewMealEntry, NewSleepEntry,
  NewWeightEntry, Program, SleepEntry, TransformationTarget, UserProfile, WeeklyMacroGoal, WeightEntry, Workout,
  WorkoutLogEntry, WorkoutSnapshot,
};

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("{0} not found")]
  NotFound(String),

  #[error("Corrupt record: {0}")]
  Corrupt(String),
}

fn corrupt(what: &str, e: impl std::fmt::Display) -> StoreError {
  StoreError::Corrupt(format!("{}: {}", what, e))
}

/// ---------------------------------------------------------------------------
/// User Profiles
/// ---------------------------------------------------------------------------

fn profile_from_row(row: &SqliteRow) -> Result<UserProfile, StoreError> {
  let gender: String = row.try_get("gender")?;
  let age: i64 = row.try_get("age")?;
  let target: i64 = row.try_get("transformation_target")?;

  Ok(UserProfile {
    user_id: row.try_get("user_id")?,
    name: row.try_get("name")?,
    age: u32::try_from(age).map_err(|e| corrupt("age", e))?,
    gender: gender.parse().map_err(|e: String| corrupt("gender", e))?,
    initial_weight: row.try_get("initial_weight")?,
    goal_weight: row.try_get("goal_weight")?,
    transformation_target: TransformationTarget::try_from(
      u32::try_from(target).map_err(|e| corrupt("transformation_target", e))?,
    )
    .map_err(|e| corrupt("transformation_target", e))?,
    target_date: row.try_get("target_date")?,
    has_completed_macro_setup: row.try_get("has_completed_macro_setup")?,
    other_goals: row.try_get("other_goals")?,
  })
}

pub async fn create_profile(pool: &SqlitePool, profile: &UserProfile) -> Result<(), StoreError> {
  let now = Utc::now();
  sqlx::query(
    r#"
    INSERT INTO user_profiles (
      user_id, name, age, gender, initial_weight, goal_weight,
      transformation_target, target_date, has_completed_macro_setup,
      other_goals, created_at, updated_at
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
    "#,
  )
  .bind(&profile.user_id)
  .bind(&profile.name)
  .bind(profile.age as i64)
  .bind(profile.gender.as_str())
  .bind(profile.initial_weight)
  .bind(profile.goal_weight)
  .bind(profile.transformation_target.weeks() as i64)
  .bind(profile.target_date)
  .bind(profile.has_completed_macro_setup)
  .bind(&profile.other_goals)
  .bind(now)
  .execute(pool)
  .await?;

  Ok(())
}

pub async fn load_profile(pool: &SqlitePool, user_id: &str) -> Result<UserProfile, StoreError> {
  let row = sqlx::query(
    r#"
    SELECT user_id, name, age, gender, initial_weight, goal_weight,
           transformation_target, target_date, has_completed_macro_setup, other_goals
    FROM user_profiles
    WHERE user_id = ?
    "#,
  )
  .bind(user_id)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| StoreError::NotFound(format!("Profile {}", user_id)))?;

  profile_from_row(&row)
}

const UPDATE_PROFILE_SQL: &str = r#"
  UPDATE user_profiles
  SET name = ?1,
      age = ?2,
      gender = ?3,
      initial_weight = ?4,
      goal_weight = ?5,
      transformation_target = ?6,
      target_date = ?7,
      has_completed_macro_setup = ?8,
      other_goals = ?9,
      updated_at = ?10
  WHERE user_id = ?11
"#;

fn update_profile_query(profile: &UserProfile) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
  sqlx::query(UPDATE_PROFILE_SQL)
    .bind(&profile.name)
    .bind(profile.age as i64)
    .bind(profile.gender.as_str())
    .bind(profile.initial_weight)
    .bind(profile.goal_weight)
    .bind(profile.transformation_target.weeks() as i64)
    .bind(profile.target_date)
    .bind(profile.has_completed_macro_setup)
    .bind(&profile.other_goals)
    .bind(Utc::now())
    .bind(&profile.user_id)
}

pub async fn save_profile(pool: &SqlitePool, profile: &UserProfile) -> Result<(), StoreError> {
  let result = update_profile_query(profile).execute(pool).await?;
  if result.rows_affected() == 0 {
    return Err(StoreError::NotFound(format!("Profile {}", profile.user_id)));
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Macro Plans
/// ---------------------------------------------------------------------------

/// Write the profile and replace the user's plan in one transaction
pub async fn save_profile_with_plan(
  pool: &SqlitePool,
  profile: &UserProfile,
  plan: &MacroPlan,
) -> Result<(), StoreError> {
  let plan_json = serde_json::to_string(&plan.plan).map_err(|e| corrupt("plan", e))?;

  let mut tx = pool.begin().await?;

  let result = update_profile_query(profile).execute(&mut *tx).await?;
  if result.rows_affected() == 0 {
    return Err(StoreError::NotFound(format!("Profile {}", profile.user_id)));
  }

  sqlx::query(
    r#"
    INSERT OR REPLACE INTO macro_plans (user_id, start_date, plan_json, created_at)
    VALUES (?1, ?2, ?3, ?4)
    "#,
  )
  .bind(&profile.user_id)
  .bind(plan.start_date)
  .bind(&plan_json)
  .bind(Utc::now())
  .execute(&mut *tx)
  .await?;

  tx.commit().await?;
  Ok(())
}

/// Write the profile and delete the user's plan in one transaction
pub async fn clear_plan(pool: &SqlitePool, profile: &UserProfile) -> Result<(), StoreError> {
  let mut tx = pool.begin().await?;

  let result = update_profile_query(profile).execute(&mut *tx).await?;
  if result.rows_affected() == 0 {
    return Err(StoreError::NotFound(format!("Profile {}", profile.user_id)));
  }

  sqlx::query("DELETE FROM macro_plans WHERE user_id = ?")
    .bind(&profile.user_id)
    .execute(&mut *tx)
    .await?;

  tx.commit().await?;
  Ok(())
}

pub async fn load_macro_plan(pool: &SqlitePool, user_id: &str) -> Result<Option<MacroPlan>, StoreError> {
  let row = sqlx::query("SELECT start_date, plan_json FROM macro_plans WHERE user_id = ?")
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

  let Some(row) = row else {
    return Ok(None);
  };

  let start_date: DateTime<Utc> = row.try_get("start_date")?;
  let plan_json: String = row.try_get("plan_json")?;
  let plan: Vec<WeeklyMacroGoal> = serde_json::from_str(&plan_json).map_err(|e| corrupt("plan", e))?;

  Ok(Some(MacroPlan { start_date, plan }))
}

/// ---------------------------------------------------------------------------
/// Programs
/// ---------------------------------------------------------------------------

fn program_from_row(row: &SqliteRow) -> Result<Program, StoreError> {
  let workouts_json: String = row.try_get("workouts_json")?;
  let workouts: Vec<Workout> =
    serde_json::from_str(&workouts_json).map_err(|e| corrupt("program workouts", e))?;

  Ok(Program {
    id: row.try_get("id")?,
    user_id: row.try_get("user_id")?,
    name: row.try_get("name")?,
    description: row.try_get("description")?,
    workouts,
    created_at: row.try_get("created_at")?,
    updated_at: row.try_get("updated_at")?,
  })
}

/// Insert or wholesale replace a program document
pub async fn save_program(pool: &SqlitePool, program: &Program) -> Result<(), StoreError> {
  let workouts_json = serde_json::to_string(&program.workouts).map_err(|e| corrupt("program workouts", e))?;

  sqlx::query(
    r#"
    INSERT INTO programs (id, user_id, name, description, workouts_json, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(id) DO UPDATE SET
      name = excluded.name,
      description = excluded.description,
      workouts_json = excluded.workouts_json,
      updated_at = excluded.updated_at
    "#,
  )
  .bind(&program.id)
  .bind(&program.user_id)
  .bind(&program.name)
  .bind(&program.description)
  .bind(&workouts_json)
  .bind(program.created_at)
  .bind(program.updated_at)
  .execute(pool)
  .await?;

  Ok(())
}

pub async fn load_program(pool: &SqlitePool, user_id: &str, program_id: &str) -> Result<Program, StoreError> {
  let row = sqlx::query("SELECT * FROM programs WHERE user_id = ? AND id = ?")
    .bind(user_id)
    .bind(program_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| StoreError::NotFound(format!("Program {}", program_id)))?;

  program_from_row(&row)
}

pub async fn list_programs(pool: &SqlitePool, user_id: &str) -> Result<Vec<Program>, StoreError> {
  let rows = sqlx::query("SELECT * FROM programs WHERE user_id = ? ORDER BY created_at DESC")
    .bind(user_id)
    .fetch_all(pool)
    .await?;

  rows.iter().map(program_from_row).collect()
}

pub async fn delete_program(pool: &SqlitePool, user_id: &str, program_id: &str) -> Result<(), StoreError> {
  let result = sqlx::query("DELETE FROM programs WHERE user_id = ? AND id = ?")
    .bind(user_id)
    .bind(program_id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(StoreError::NotFound(format!("Program {}", program_id)));
  }
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Workout Logs
/// ---------------------------------------------------------------------------

fn log_from_row(row: &SqliteRow) -> Result<WorkoutLogEntry, StoreError> {
  let snapshot_json: String = row.try_get("workout_snapshot_json")?;
  let workout_snapshot: WorkoutSnapshot =
    serde_json::from_str(&snapshot_json).map_err(|e| corrupt("workout snapshot", e))?;
  let week: i64 = row.try_get("week_completed")?;

  Ok(WorkoutLogEntry {
    log_id: row.try_get("log_id")?,
    workout_id: row.try_get("workout_id")?,
    program_name: row.try_get("program_name")?,
    completed_at: row.try_get("completed_at")?,
    workout_snapshot,
    week_completed: u32::try_from(week).map_err(|e| corrupt("week_completed", e))?,
  })
}

pub async fn insert_workout_log(
  pool: &SqlitePool,
  user_id: &str,
  entry: &WorkoutLogEntry,
) -> Result<(), StoreError> {
  let snapshot_json =
    serde_json::to_string(&entry.workout_snapshot).map_err(|e| corrupt("workout snapshot", e))?;

  sqlx::query(
    r#"
    INSERT INTO workout_logs
      (log_id, user_id, workout_id, program_name, completed_at, workout_snapshot_json, week_completed)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
  )
  .bind(&entry.log_id)
  .bind(user_id)
  .bind(&entry.workout_id)
  .bind(&entry.program_name)
  .bind(entry.completed_at)
  .bind(&snapshot_json)
  .bind(entry.week_completed as i64)
  .execute(pool)
  .await?;

  Ok(())
}

/// Most recently completed session for one workout template
pub async fn latest_log_for_workout(
  pool: &SqlitePool,
  user_id: &str,
  workout_id: &str,
) -> Result<Option<WorkoutLogEntry>, StoreError> {
  let row = sqlx::query(
    r#"
    SELECT * FROM workout_logs
    WHERE user_id = ? AND workout_id = ?
    ORDER BY completed_at DESC
    LIMIT 1
    "#,
  )
  .bind(user_id)
  .bind(workout_id)
  .fetch_optional(pool)
  .await?;

  row.as_ref().map(log_from_row).transpose()
}

pub async fn list_workout_logs(
  pool: &SqlitePool,
  user_id: &str,
  limit: i64,
) -> Result<Vec<WorkoutLogEntry>, StoreError> {
  let rows = sqlx::query("SELECT * FROM workout_logs WHERE user_id = ? ORDER BY completed_at DESC LIMIT ?")
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

  rows.iter().map(log_from_row).collect()
}

/// ---------------------------------------------------------------------------
/// Body Weight
/// ---------------------------------------------------------------------------

pub async fn insert_weight(pool: &SqlitePool, user_id: &str, entry: &NewWeightEntry) -> Result<i64, StoreError> {
  let result = sqlx::query("INSERT INTO weight_entries (user_id, logged_on, weight, notes) VALUES (?1, ?2, ?3, ?4)")
    .bind(user_id)
    .bind(entry.logged_on)
    .bind(entry.weight)
    .bind(&entry.notes)
    .execute(pool)
    .await?;

  Ok(result.last_insert_rowid())
}

pub async fn list_weights(
  pool: &SqlitePool,
  user_id: &str,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<WeightEntry>, StoreError> {
  let entries = sqlx::query_as::<_, WeightEntry>(
    r#"
    SELECT id, user_id, logged_on, weight, notes FROM weight_entries
    WHERE user_id = ? AND logged_on BETWEEN ? AND ?
    ORDER BY logged_on, id
    "#,
  )
  .bind(user_id)
  .bind(from)
  .bind(to)
  .fetch_all(pool)
  .await?;

  Ok(entries)
}

/// Latest entry on or before `on`
pub async fn latest_weight(pool: &SqlitePool, user_id: &str, on: NaiveDate) -> Result<Option<WeightEntry>, StoreError> {
  let entry = sqlx::query_as::<_, WeightEntry>(
    r#"
    SELECT id, user_id, logged_on, weight, notes FROM weight_entries
    WHERE user_id = ? AND logged_on <= ?
    ORDER BY logged_on DESC, id DESC
    LIMIT 1
    "#,
  )
  .bind(user_id)
  .bind(on)
  .fetch_optional(pool)
  .await?;

  Ok(entry)
}

/// Delete a row from one of the per-user tracking tables
async fn delete_tracking_row(pool: &SqlitePool, table: &str, user_id: &str, id: i64) -> Result<(), StoreError> {
  let sql = format!("DELETE FROM {} WHERE user_id = ? AND id = ?", table);
  let result = sqlx::query(&sql).bind(user_id).bind(id).execute(pool).await?;
  if result.rows_affected() == 0 {
    return Err(StoreError::NotFound(format!("{} entry {}", table, id)));
  }
  Ok(())
}

pub async fn delete_weight(pool: &SqlitePool, user_id: &str, id: i64) -> Result<(), StoreError> {
  delete_tracking_row(pool, "weight_entries", user_id, id).await
}

/// ---------------------------------------------------------------------------
/// Meals
/// ---------------------------------------------------------------------------

fn meal_from_row(row: &SqliteRow) -> Result<MealEntry, StoreError> {
  let meal_type: String = row.try_get("meal_type")?;
  Ok(MealEntry {
    id: row.try_get("id")?,
    user_id: row.try_get("user_id")?,
    eaten_on: row.try_get("eaten_on")?,
    meal_type: meal_type.parse().map_err(|e: String| corrupt("meal_type", e))?,
    food_name: row.try_get("food_name")?,
    servings: row.try_get("servings")?,
    per_serving: MacroTotals {
      calories: row.try_get("calories_per_serving")?,
      protein: row.try_get("protein_per_serving")?,
      carbs: row.try_get("carbs_per_serving")?,
      fats: row.try_get("fats_per_serving")?,
    },
  })
}

pub async fn insert_meal(pool: &SqlitePool, user_id: &str, meal: &NewMealEntry) -> Result<i64, StoreError> {
  let result = sqlx::query(
    r#"
    INSERT INTO meal_entries (
      user_id, eaten_on, meal_type, food_name, servings,
      calories_per_serving, protein_per_serving, carbs_per_serving, fats_per_serving
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    "#,
  )
  .bind(user_id)
  .bind(meal.eaten_on)
  .bind(meal.meal_type.as_str())
  .bind(&meal.food_name)
  .bind(meal.servings)
  .bind(meal.per_serving.calories)
  .bind(meal.per_serving.protein)
  .bind(meal.per_serving.carbs)
  .bind(meal.per_serving.fats)
  .execute(pool)
  .await?;

  Ok(result.last_insert_rowid())
}

pub async fn list_meals_on(pool: &SqlitePool, user_id: &str, day: NaiveDate) -> Result<Vec<MealEntry>, StoreError> {
  let rows = sqlx::query("SELECT * FROM meal_entries WHERE user_id = ? AND eaten_on = ? ORDER BY id")
    .bind(user_id)
    .bind(day)
    .fetch_all(pool)
    .await?;

  rows.iter().map(meal_from_row).collect()
}

pub async fn delete_meal(pool: &SqlitePool, user_id: &str, id: i64) -> Result<(), StoreError> {
  delete_tracking_row(pool, "meal_entries", user_id, id).await
}

/// ---------------------------------------------------------------------------
/// Sleep and Check-ins
/// ---------------------------------------------------------------------------

pub async fn insert_sleep(pool: &SqlitePool, user_id: &str, entry: &NewSleepEntry) -> Result<i64, StoreError> {
  let result = sqlx::query("INSERT INTO sleep_entries (user_id, night_of, hours, quality) VALUES (?1, ?2, ?3, ?4)")
    .bind(user_id)
    .bind(entry.night_of)
    .bind(entry.hours)
    .bind(entry.quality)
    .execute(pool)
    .await?;

  Ok(result.last_insert_rowid())
}

pub async fn list_sleep(
  pool: &SqlitePool,
  user_id: &str,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<SleepEntry>, StoreError> {
  let entries = sqlx::query_as::<_, SleepEntry>(
    r#"
    SELECT id, user_id, night_of, hours, quality FROM sleep_entries
    WHERE user_id = ? AND night_of BETWEEN ? AND ?
    ORDER BY night_of, id
    "#,
  )
  .bind(user_id)
  .bind(from)
  .bind(to)
  .fetch_all(pool)
  .await?;

  Ok(entries)
}

pub async fn delete_sleep(pool: &SqlitePool, user_id: &str, id: i64) -> Result<(), StoreError> {
  delete_tracking_row(pool, "sleep_entries", user_id, id).await
}

/// One check-in per day; a second submission replaces the first
pub async fn upsert_check_in(pool: &SqlitePool, user_id: &str, check_in: &NewCheckIn) -> Result<(), StoreError> {
  sqlx::query(
    r#"
    INSERT INTO check_ins (user_id, checked_on, energy, hunger, adherence, notes)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(user_id, checked_on) DO UPDATE SET
      energy = excluded.energy,
      hunger = excluded.hunger,
      adherence = excluded.adherence,
      notes = excluded.notes
    "#,
  )
  .bind(user_id)
  .bind(check_in.checked_on)
  .bind(check_in.energy)
  .bind(check_in.hunger)
  .bind(check_in.adherence)
  .bind(&check_in.notes)
  .execute(pool)
  .await?;

  Ok(())
}

pub async fn list_check_ins(
  pool: &SqlitePool,
  user_id: &str,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<CheckIn>, StoreError> {
  let entries = sqlx::query_as::<_, CheckIn>(
    r#"
    SELECT id, user_id, checked_on, energy, hunger, adherence, notes FROM check_ins
    WHERE user_id = ? AND checked_on BETWEEN ? AND ?
    ORDER BY checked_on
    "#,
  )
  .bind(user_id)
  .bind(from)
  .bind(to)
  .fetch_all(pool)
  .await?;

  Ok(entries)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Gender, MealType};
  use crate::test_utils::{mock_workout, seed_test_profile, setup_test_db, teardown_test_db};
  use chrono::Duration;

  fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  #[tokio::test]
  async fn test_profile_roundtrip() {
    let pool = setup_test_db().await;
    seed_test_profile(&pool, "user-1").await;

    let mut profile = load_profile(&pool, "user-1").await.expect("Should load profile");
    assert!(!profile.has_completed_macro_setup);
    assert_eq!(profile.transformation_target, TransformationTarget::Weeks12);

    profile.gender = Gender::Female;
    profile.age = 41;
    profile.other_goals = "Run a 10k".to_string();
    save_profile(&pool, &profile).await.expect("Should save profile");

    let reloaded = load_profile(&pool, "user-1").await.unwrap();
    assert_eq!(reloaded.gender, Gender::Female);
    assert_eq!(reloaded.age, 41);
    assert_eq!(reloaded.other_goals, "Run a 10k");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_missing_profile_is_not_found() {
    let pool = setup_test_db().await;
    let result = load_profile(&pool, "nobody").await;
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_program_save_replaces_document() {
    let pool = setup_test_db().await;
    seed_test_profile(&pool, "user-1").await;

    let mut program = Program {
      id: "prog-1".to_string(),
      user_id: "user-1".to_string(),
      name: "Upper/Lower".to_string(),
      description: None,
      workouts: vec![mock_workout("w-upper")],
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };
    save_program(&pool, &program).await.unwrap();

    program.workouts.push(mock_workout("w-lower"));
    program.description = Some("Four days a week".to_string());
    save_program(&pool, &program).await.unwrap();

    let loaded = load_program(&pool, "user-1", "prog-1").await.unwrap();
    assert_eq!(loaded.workouts.len(), 2);
    assert_eq!(loaded.description.as_deref(), Some("Four days a week"));
    assert_eq!(list_programs(&pool, "user-1").await.unwrap().len(), 1);

    // Other users cannot see it
    assert!(load_program(&pool, "user-2", "prog-1").await.is_err());

    delete_program(&pool, "user-1", "prog-1").await.unwrap();
    assert!(list_programs(&pool, "user-1").await.unwrap().is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_latest_log_for_workout() {
    let pool = setup_test_db().await;
    seed_test_profile(&pool, "user-1").await;

    let workout = mock_workout("w-upper");
    let now = Utc::now();
    for (i, week) in [3u32, 4, 5].iter().enumerate() {
      let entry = WorkoutLogEntry {
        log_id: format!("log-{}", i),
        workout_id: workout.id.clone(),
        program_name: "Upper/Lower".to_string(),
        completed_at: now - Duration::days(10 - i as i64 * 3),
        workout_snapshot: WorkoutSnapshot {
          workout_id: workout.id.clone(),
          name: workout.name.clone(),
          exercises: Vec::new(),
        },
        week_completed: *week,
      };
      insert_workout_log(&pool, "user-1", &entry).await.unwrap();
    }

    let latest = latest_log_for_workout(&pool, "user-1", "w-upper").await.unwrap().unwrap();
    assert_eq!(latest.week_completed, 5);
    assert!(latest_log_for_workout(&pool, "user-1", "w-other").await.unwrap().is_none());
    assert_eq!(list_workout_logs(&pool, "user-1", 2).await.unwrap().len(), 2);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_tracking_rows_by_date() {
    let pool = setup_test_db().await;
    seed_test_profile(&pool, "user-1").await;

    for (d, w) in [("2025-03-01", 181.0), ("2025-03-03", 180.2), ("2025-03-08", 179.4)] {
      insert_weight(&pool, "user-1", &NewWeightEntry { logged_on: day(d), weight: w, notes: None })
        .await
        .unwrap();
    }
    let week = list_weights(&pool, "user-1", day("2025-03-01"), day("2025-03-07")).await.unwrap();
    assert_eq!(week.len(), 2);
    let latest = latest_weight(&pool, "user-1", day("2025-03-05")).await.unwrap().unwrap();
    assert_eq!(latest.weight, 180.2);

    let meal_id = insert_meal(
      &pool,
      "user-1",
      &NewMealEntry {
        eaten_on: day("2025-03-03"),
        meal_type: MealType::Lunch,
        food_name: "Chicken breast".to_string(),
        servings: 1.5,
        per_serving: MacroTotals { calories: 165.0, protein: 31.0, carbs: 0.0, fats: 3.6 },
      },
    )
    .await
    .unwrap();
    let meals = list_meals_on(&pool, "user-1", day("2025-03-03")).await.unwrap();
    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].meal_type, MealType::Lunch);
    delete_meal(&pool, "user-1", meal_id).await.unwrap();
    assert!(delete_meal(&pool, "user-1", meal_id).await.is_err());

    let check_in = NewCheckIn { checked_on: day("2025-03-03"), energy: 3, hunger: 2, adherence: 4, notes: None };
    upsert_check_in(&pool, "user-1", &check_in).await.unwrap();
    upsert_check_in(&pool, "user-1", &NewCheckIn { energy: 5, ..check_in }).await.unwrap();
    let check_ins = list_check_ins(&pool, "user-1", day("2025-03-01"), day("2025-03-31")).await.unwrap();
    assert_eq!(check_ins.len(), 1);
    assert_eq!(check_ins[0].energy, 5);

    teardown_test_db(pool).await;
  }
}
