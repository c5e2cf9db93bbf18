use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::db::AppState;
use crate::llm::{ClaudeClient, ProgramRequest};
use crate::models::{Program, Workout, WorkoutLogEntry, WorkoutSession};
use crate::progression::{self, ProgressionError};
use crate::store::{self, StoreError};

/// ---------------------------------------------------------------------------
/// Program Commands
/// ---------------------------------------------------------------------------

/// Give every workout and exercise a usable id. Blank ids and repeats of an
/// id already used in the program get a fresh uuid.
fn assign_missing_ids(workouts: &mut [Workout]) {
  let mut workout_ids = HashSet::new();
  for workout in workouts {
    if workout.id.is_empty() || !workout_ids.insert(workout.id.clone()) {
      workout.id = Uuid::new_v4().to_string();
      workout_ids.insert(workout.id.clone());
    }

    let mut exercise_ids = HashSet::new();
    for exercise in &mut workout.exercises {
      if exercise.id.is_empty() || !exercise_ids.insert(exercise.id.clone()) {
        exercise.id = Uuid::new_v4().to_string();
        exercise_ids.insert(exercise.id.clone());
      }
    }
  }
}

/// Store a hand-written program. Missing ids are filled in.
pub async fn create_program(
  state: &AppState,
  user_id: &str,
  name: &str,
  description: Option<String>,
  mut workouts: Vec<Workout>,
) -> Result<Program, String> {
  progression::validate_workouts(&workouts).map_err(|e| e.to_string())?;
  assign_missing_ids(&mut workouts);

  let now = Utc::now();
  let program = Program {
    id: Uuid::new_v4().to_string(),
    user_id: user_id.to_string(),
    name: name.to_string(),
    description,
    workouts,
    created_at: now,
    updated_at: now,
  };

  store::save_program(&state.db, &program)
    .await
    .map_err(|e| format!("Failed to save program: {}", e))?;

  Ok(program)
}

/// Replace a program's workouts wholesale
pub async fn update_program_workouts(
  state: &AppState,
  user_id: &str,
  program_id: &str,
  mut workouts: Vec<Workout>,
) -> Result<Program, String> {
  progression::validate_workouts(&workouts).map_err(|e| e.to_string())?;
  assign_missing_ids(&mut workouts);

  let mut program = store::load_program(&state.db, user_id, program_id)
    .await
    .map_err(|e| format!("Failed to load program: {}", e))?;
  program.workouts = workouts;
  program.updated_at = Utc::now();

  store::save_program(&state.db, &program)
    .await
    .map_err(|e| format!("Failed to save program: {}", e))?;

  Ok(program)
}

pub async fn list_programs(state: &AppState, user_id: &str) -> Result<Vec<Program>, String> {
  store::list_programs(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to list programs: {}", e))
}

pub async fn delete_program(state: &AppState, user_id: &str, program_id: &str) -> Result<(), String> {
  store::delete_program(&state.db, user_id, program_id)
    .await
    .map_err(|e| format!("Failed to delete program: {}", e))
}

/// Ask the LLM for a program and store it
pub async fn generate_program(
  state: &AppState,
  user_id: &str,
  request: ProgramRequest,
) -> Result<Program, String> {
  let client = ClaudeClient::from_config(&state.config).map_err(|e| e.to_string())?;
  let (program, _usage) = client
    .generate_program(user_id, &request)
    .await
    .map_err(|e| format!("Program generation failed: {}", e))?;

  store::save_program(&state.db, &program)
    .await
    .map_err(|e| format!("Failed to save program: {}", e))?;

  Ok(program)
}

/// ---------------------------------------------------------------------------
/// Session Commands
/// ---------------------------------------------------------------------------

/// Resolve a workout for its next week and pre-fill the set list
pub async fn start_workout(
  state: &AppState,
  user_id: &str,
  program_id: &str,
  workout_id: &str,
) -> Result<WorkoutSession, String> {
  let program = match store::load_program(&state.db, user_id, program_id).await {
    Ok(program) => program,
    Err(StoreError::NotFound(_)) => {
      return Err(ProgressionError::WorkoutNotFound(workout_id.to_string()).to_string())
    }
    Err(e) => return Err(format!("Failed to load program: {}", e)),
  };

  let workout = program
    .find_workout(workout_id)
    .ok_or_else(|| ProgressionError::WorkoutNotFound(workout_id.to_string()).to_string())?;

  let last_log = store::latest_log_for_workout(&state.db, user_id, workout_id)
    .await
    .map_err(|e| format!("Failed to load workout history: {}", e))?;

  let session = progression::start_session(workout, &program.name, last_log.as_ref());
  tracing::debug!(user_id, workout_id, week = session.week, "workout session started");

  Ok(session)
}

/// Store the performed session as an immutable log entry
pub async fn finish_workout(
  state: &AppState,
  user_id: &str,
  session: WorkoutSession,
) -> Result<WorkoutLogEntry, String> {
  let entry = progression::finish_session(session, Utc::now());

  store::insert_workout_log(&state.db, user_id, &entry)
    .await
    .map_err(|e| format!("Failed to save workout log: {}", e))?;

  tracing::info!(
    user_id,
    workout_id = %entry.workout_id,
    week = entry.week_completed,
    "workout completed"
  );
  Ok(entry)
}

pub async fn get_workout_history(
  state: &AppState,
  user_id: &str,
  limit: i64,
) -> Result<Vec<WorkoutLogEntry>, String> {
  store::list_workout_logs(&state.db, user_id, limit)
    .await
    .map_err(|e| format!("Failed to fetch workout history: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Exercise, ProgressionOverride, RepScheme};
  use crate::test_utils::{mock_workout, seed_test_profile, setup_test_state};

  fn progressive_workout() -> Workout {
    Workout {
      id: String::new(),
      name: "Push".to_string(),
      exercises: vec![Exercise {
        id: String::new(),
        name: "Overhead Press".to_string(),
        sets: Some(3),
        reps: Some(RepScheme::from("6-8")),
        weight: Some(95.0),
        notes: None,
        progression: vec![ProgressionOverride {
          week: 2,
          sets: Some(4),
          reps: None,
          weight: Some(100.0),
        }],
      }],
    }
  }

  #[tokio::test]
  async fn test_sessions_progress_week_by_week() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;

    let program = create_program(&state, "user-1", "PPL", None, vec![progressive_workout()])
      .await
      .unwrap();
    let workout_id = program.workouts[0].id.clone();
    assert!(!workout_id.is_empty());
    assert!(!program.workouts[0].exercises[0].id.is_empty());

    let week1 = start_workout(&state, "user-1", &program.id, &workout_id).await.unwrap();
    assert_eq!(week1.week, 1);
    assert_eq!(week1.exercises[0].sets, 3);
    assert_eq!(week1.exercises[0].performance[0].reps, Some(6));

    let mut performed = week1;
    for set in &mut performed.exercises[0].performance {
      set.completed = true;
    }
    let log = finish_workout(&state, "user-1", performed).await.unwrap();
    assert_eq!(log.week_completed, 1);
    assert!(log.workout_snapshot.exercises[0].performance.iter().all(|s| s.completed));

    let week2 = start_workout(&state, "user-1", &program.id, &workout_id).await.unwrap();
    assert_eq!(week2.week, 2);
    assert_eq!(week2.exercises[0].sets, 4);
    assert_eq!(week2.exercises[0].weight, Some(100.0));

    assert_eq!(get_workout_history(&state, "user-1", 10).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_missing_workout_is_not_found() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;

    let program = create_program(&state, "user-1", "PPL", None, vec![mock_workout("w-1")])
      .await
      .unwrap();

    let err = start_workout(&state, "user-1", &program.id, "w-deleted").await.unwrap_err();
    assert!(err.contains("Workout not found"));

    let err = start_workout(&state, "user-1", "no-such-program", "w-1").await.unwrap_err();
    assert!(err.contains("Workout not found"));
  }

  #[tokio::test]
  async fn test_duplicate_override_weeks_rejected_on_write() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;

    let mut workout = progressive_workout();
    let repeat = workout.exercises[0].progression[0].clone();
    workout.exercises[0].progression.push(repeat);

    let err = create_program(&state, "user-1", "PPL", None, vec![workout]).await.unwrap_err();
    assert!(err.contains("more than one override"));
    assert!(list_programs(&state, "user-1").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_template_edits_do_not_touch_logged_snapshots() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;

    let program = create_program(&state, "user-1", "PPL", None, vec![mock_workout("w-1")])
      .await
      .unwrap();
    let session = start_workout(&state, "user-1", &program.id, "w-1").await.unwrap();
    let logged = finish_workout(&state, "user-1", session).await.unwrap();

    let mut edited = program.workouts.clone();
    edited[0].exercises.clear();
    update_program_workouts(&state, "user-1", &program.id, edited).await.unwrap();

    let history = get_workout_history(&state, "user-1", 10).await.unwrap();
    assert_eq!(history[0].workout_snapshot, logged.workout_snapshot);
    assert!(!history[0].workout_snapshot.exercises.is_empty());
  }

  #[tokio::test]
  async fn test_workouts_added_by_update_get_distinct_ids() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;

    let program = create_program(&state, "user-1", "PPL", None, vec![mock_workout("w-1")])
      .await
      .unwrap();

    let mut legs_a = mock_workout("");
    legs_a.name = "Legs A".to_string();
    let mut legs_b = mock_workout("");
    legs_b.name = "Legs B".to_string();
    let mut workouts = program.workouts.clone();
    workouts.push(legs_a);
    workouts.push(legs_b);

    let updated = update_program_workouts(&state, "user-1", &program.id, workouts)
      .await
      .unwrap();
    let ids: Vec<&str> = updated.workouts.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids[0], "w-1");
    assert!(ids.iter().all(|id| !id.is_empty()));
    assert_ne!(ids[1], ids[2]);

    let b_id = updated.workouts[2].id.clone();
    let session = start_workout(&state, "user-1", &program.id, &b_id).await.unwrap();
    assert_eq!(session.workout_name, "Legs B");
  }

  #[tokio::test]
  async fn test_oversized_set_count_rejected_on_write() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;

    let mut workout = progressive_workout();
    workout.exercises[0].sets = Some(20_000_000);

    let err = create_program(&state, "user-1", "PPL", None, vec![workout]).await.unwrap_err();
    assert!(err.contains("sets"));
    assert!(list_programs(&state, "user-1").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_generate_program_requires_api_key() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;

    let request = ProgramRequest {
      goals: "Get stronger".to_string(),
      days_per_week: 3,
      experience: "novice".to_string(),
      equipment: Vec::new(),
      session_minutes: None,
      other_goals: None,
    };
    let err = generate_program(&state, "user-1", request).await.unwrap_err();
    assert!(err.contains("API key"));
  }
}
