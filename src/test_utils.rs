//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Helper assertions

use sqlx::SqlitePool;
use url::Url;

use crate::config::{AppConfig, DEFAULT_LLM_BASE_URL};
use crate::db::AppState;
use crate::models::{
  Exercise, Gender, ProgressionOverride, RepScheme, TransformationTarget, UserProfile, Workout,
};
use crate::plan::PlanInput;
use crate::store;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// App state over a fresh in-memory database with no LLM key and no calorie floor
pub async fn setup_test_state() -> AppState {
  AppState {
    db: setup_test_db().await,
    config: AppConfig {
      database_url: "sqlite::memory:".to_string(),
      anthropic_api_key: None,
      llm_base_url: Url::parse(DEFAULT_LLM_BASE_URL).expect("Default base URL should parse"),
      calorie_floor: None,
    },
  }
}

/// Insert a placeholder profile; every per-user table references one
pub async fn seed_test_profile(pool: &SqlitePool, user_id: &str) {
  store::create_profile(pool, &UserProfile::placeholder(user_id, "Test User"))
    .await
    .expect("Failed to seed profile");
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Upper-body workout: a progressed bench press and an un-progressed row
pub fn mock_workout(id: &str) -> Workout {
  Workout {
    id: id.to_string(),
    name: "Upper".to_string(),
    exercises: vec![
      Exercise {
        id: format!("{}-bench", id),
        name: "Bench Press".to_string(),
        sets: Some(3),
        reps: Some(RepScheme::from("8-12")),
        weight: Some(135.0),
        notes: None,
        progression: vec![
          ProgressionOverride {
            week: 4,
            sets: Some(4),
            reps: Some(RepScheme::from("6-8")),
            weight: Some(155.0),
          },
          ProgressionOverride {
            week: 8,
            sets: None,
            reps: None,
            weight: Some(165.0),
          },
        ],
      },
      Exercise {
        id: format!("{}-row", id),
        name: "Barbell Row".to_string(),
        sets: Some(3),
        reps: Some(RepScheme::Count(10)),
        weight: Some(115.0),
        notes: Some("Pull to lower chest".to_string()),
        progression: Vec::new(),
      },
    ],
  }
}

/// 180 lb male, age 30, cutting to 170 lb over 12 weeks
pub fn mock_plan_input() -> PlanInput {
  PlanInput {
    initial_weight: 180.0,
    goal_weight: 170.0,
    transformation_target: TransformationTarget::Weeks12,
    age: 30,
    gender: Gender::Male,
  }
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('user_profiles', 'macro_plans', 'programs', 'workout_logs')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 4, "Expected 4 core tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_profile_is_loadable() {
    let pool = setup_test_db().await;
    seed_test_profile(&pool, "user-1").await;

    let profile = store::load_profile(&pool, "user-1").await.expect("Should load profile");
    assert_eq!(profile.name, "Test User");
    assert!(!profile.has_completed_macro_setup);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let workout = mock_workout("w-1");
    assert_eq!(workout.exercises.len(), 2);
    assert!(crate::progression::validate_workouts(&[workout]).is_ok());

    let input = mock_plan_input();
    assert!(input.validate().is_ok());
  }
}
