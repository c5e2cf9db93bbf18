use chrono::Utc;
use serde::Serialize;

use crate::db::AppState;
use crate::models::{MacroPlan, UserProfile, WeeklyMacroGoal};
use crate::plan::{self, PlanInput};
use crate::store;

/// ---------------------------------------------------------------------------
/// Macro Plan Commands
/// ---------------------------------------------------------------------------

/// Preview a plan without storing anything
pub fn preview_plan(state: &AppState, input: &PlanInput) -> Result<Vec<WeeklyMacroGoal>, String> {
  plan::calculate_weekly_plan(input, &state.config.plan_options()).map_err(|e| e.to_string())
}

/// Finish macro setup: lock in weight/timeline and store the weekly plan
pub async fn complete_setup(state: &AppState, user_id: &str, input: PlanInput) -> Result<MacroPlan, String> {
  plan::complete_macro_setup(
    &state.db,
    user_id,
    &input,
    &state.config.plan_options(),
    Utc::now(),
  )
  .await
  .map_err(|e| format!("Macro setup failed: {}", e))
}

pub async fn reset_plan(state: &AppState, user_id: &str) -> Result<UserProfile, String> {
  plan::reset_macro_plan(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to reset plan: {}", e))
}

pub async fn get_plan(state: &AppState, user_id: &str) -> Result<Option<MacroPlan>, String> {
  store::load_macro_plan(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to load plan: {}", e))
}

#[derive(Debug, Serialize)]
pub struct ActiveGoals {
  pub goal: WeeklyMacroGoal,
  pub total_weeks: usize,
}

/// Targets in effect right now; `None` when no plan is active
pub async fn get_active_goals(state: &AppState, user_id: &str) -> Result<Option<ActiveGoals>, String> {
  let Some(macro_plan) = get_plan(state, user_id).await? else {
    return Ok(None);
  };

  Ok(
    plan::active_week_goal(&macro_plan, Utc::now()).map(|goal| ActiveGoals {
      goal: *goal,
      total_weeks: macro_plan.plan.len(),
    }),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{mock_plan_input, seed_test_profile, setup_test_state};

  #[tokio::test]
  async fn test_no_plan_means_no_active_goals() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;
    assert!(get_active_goals(&state, "user-1").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_setup_then_active_goals_are_week_one() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;

    let stored = complete_setup(&state, "user-1", mock_plan_input()).await.unwrap();
    let active = get_active_goals(&state, "user-1").await.unwrap().unwrap();
    assert_eq!(active.goal, stored.plan[0]);
    assert_eq!(active.total_weeks, 12);

    reset_plan(&state, "user-1").await.unwrap();
    assert!(get_active_goals(&state, "user-1").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_preview_reports_invalid_input() {
    let state = setup_test_state().await;
    let mut input = mock_plan_input();
    input.initial_weight = 2000.0;
    let err = preview_plan(&state, &input).unwrap_err();
    assert!(err.contains("Invalid profile data"));
  }
}
