use chrono::{NaiveDate, Utc};

use crate::db::AppState;
use crate::models::{
  CheckIn, MealEntry, NewCheckIn, NewMealEntry, NewSleepEntry, NewWeightEntry, SleepEntry, WeightEntry,
};
use crate::store;
use crate::tracking::{self, DailySummary};

/// ---------------------------------------------------------------------------
/// Input Checks
/// ---------------------------------------------------------------------------

fn check_score(name: &str, value: i64) -> Result<(), String> {
  if (1..=5).contains(&value) {
    Ok(())
  } else {
    Err(format!("{} must be between 1 and 5, got {}", name, value))
  }
}

/// ---------------------------------------------------------------------------
/// Logging Commands
/// ---------------------------------------------------------------------------

pub async fn log_weight(state: &AppState, user_id: &str, entry: NewWeightEntry) -> Result<i64, String> {
  if !(entry.weight.is_finite() && entry.weight > 0.0) {
    return Err(format!("Weight must be positive, got {}", entry.weight));
  }
  store::insert_weight(&state.db, user_id, &entry)
    .await
    .map_err(|e| format!("Failed to log weight: {}", e))
}

pub async fn get_weights(
  state: &AppState,
  user_id: &str,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<WeightEntry>, String> {
  store::list_weights(&state.db, user_id, from, to)
    .await
    .map_err(|e| format!("Failed to fetch weights: {}", e))
}

pub async fn delete_weight(state: &AppState, user_id: &str, id: i64) -> Result<(), String> {
  store::delete_weight(&state.db, user_id, id)
    .await
    .map_err(|e| format!("Failed to delete weight: {}", e))
}

pub async fn log_meal(state: &AppState, user_id: &str, meal: NewMealEntry) -> Result<i64, String> {
  if !(meal.servings.is_finite() && meal.servings > 0.0) {
    return Err(format!("Servings must be positive, got {}", meal.servings));
  }
  store::insert_meal(&state.db, user_id, &meal)
    .await
    .map_err(|e| format!("Failed to log meal: {}", e))
}

pub async fn get_meals(state: &AppState, user_id: &str, day: NaiveDate) -> Result<Vec<MealEntry>, String> {
  store::list_meals_on(&state.db, user_id, day)
    .await
    .map_err(|e| format!("Failed to fetch meals: {}", e))
}

pub async fn delete_meal(state: &AppState, user_id: &str, id: i64) -> Result<(), String> {
  store::delete_meal(&state.db, user_id, id)
    .await
    .map_err(|e| format!("Failed to delete meal: {}", e))
}

pub async fn log_sleep(state: &AppState, user_id: &str, entry: NewSleepEntry) -> Result<i64, String> {
  if !(0.0..=24.0).contains(&entry.hours) {
    return Err(format!("Sleep hours must be between 0 and 24, got {}", entry.hours));
  }
  if let Some(quality) = entry.quality {
    check_score("Sleep quality", quality)?;
  }
  store::insert_sleep(&state.db, user_id, &entry)
    .await
    .map_err(|e| format!("Failed to log sleep: {}", e))
}

pub async fn get_sleep(
  state: &AppState,
  user_id: &str,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<SleepEntry>, String> {
  store::list_sleep(&state.db, user_id, from, to)
    .await
    .map_err(|e| format!("Failed to fetch sleep: {}", e))
}

pub async fn delete_sleep(state: &AppState, user_id: &str, id: i64) -> Result<(), String> {
  store::delete_sleep(&state.db, user_id, id)
    .await
    .map_err(|e| format!("Failed to delete sleep entry: {}", e))
}

pub async fn submit_check_in(state: &AppState, user_id: &str, check_in: NewCheckIn) -> Result<(), String> {
  check_score("Energy", check_in.energy)?;
  check_score("Hunger", check_in.hunger)?;
  check_score("Adherence", check_in.adherence)?;
  store::upsert_check_in(&state.db, user_id, &check_in)
    .await
    .map_err(|e| format!("Failed to save check-in: {}", e))
}

pub async fn get_check_ins(
  state: &AppState,
  user_id: &str,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<CheckIn>, String> {
  store::list_check_ins(&state.db, user_id, from, to)
    .await
    .map_err(|e| format!("Failed to fetch check-ins: {}", e))
}

/// ---------------------------------------------------------------------------
/// Dashboard
/// ---------------------------------------------------------------------------

pub async fn get_daily_summary(state: &AppState, user_id: &str, day: NaiveDate) -> Result<DailySummary, String> {
  tracking::load_daily_summary(&state.db, user_id, day, Utc::now())
    .await
    .map_err(|e| format!("Failed to build daily summary: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{MacroTotals, MealType};
  use crate::test_utils::{mock_plan_input, seed_test_profile, setup_test_state};

  #[tokio::test]
  async fn test_meals_count_against_todays_targets() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;
    crate::commands::nutrition::complete_setup(&state, "user-1", mock_plan_input())
      .await
      .unwrap();

    let today = Utc::now().date_naive();
    log_meal(
      &state,
      "user-1",
      NewMealEntry {
        eaten_on: today,
        meal_type: MealType::Breakfast,
        food_name: "Oats".to_string(),
        servings: 2.0,
        per_serving: MacroTotals { calories: 150.0, protein: 5.0, carbs: 27.0, fats: 3.0 },
      },
    )
    .await
    .unwrap();

    let summary = get_daily_summary(&state, "user-1", today).await.unwrap();
    let target = summary.target.unwrap();
    let remaining = summary.remaining.unwrap();
    assert_eq!(summary.meals_logged, 1);
    assert_eq!(remaining.calories, target.calories as f64 - 300.0);
    assert_eq!(remaining.protein, target.protein as f64 - 10.0);
  }

  #[tokio::test]
  async fn test_rejects_out_of_range_inputs() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;
    let today = Utc::now().date_naive();

    let bad_weight = NewWeightEntry { logged_on: today, weight: -4.0, notes: None };
    assert!(log_weight(&state, "user-1", bad_weight).await.is_err());

    let bad_sleep = NewSleepEntry { night_of: today, hours: 30.0, quality: None };
    assert!(log_sleep(&state, "user-1", bad_sleep).await.is_err());

    let bad_check_in = NewCheckIn { checked_on: today, energy: 0, hunger: 3, adherence: 3, notes: None };
    let err = submit_check_in(&state, "user-1", bad_check_in).await.unwrap_err();
    assert!(err.contains("Energy"));
  }

  #[tokio::test]
  async fn test_sleep_and_weight_history() {
    let state = setup_test_state().await;
    seed_test_profile(&state.db, "user-1").await;
    let today = Utc::now().date_naive();

    let id = log_sleep(&state, "user-1", NewSleepEntry { night_of: today, hours: 7.5, quality: Some(4) })
      .await
      .unwrap();
    assert_eq!(get_sleep(&state, "user-1", today, today).await.unwrap().len(), 1);
    delete_sleep(&state, "user-1", id).await.unwrap();
    assert!(get_sleep(&state, "user-1", today, today).await.unwrap().is_empty());

    log_weight(&state, "user-1", NewWeightEntry { logged_on: today, weight: 179.0, notes: None })
      .await
      .unwrap();
    let weights = get_weights(&state, "user-1", today, today).await.unwrap();
    assert_eq!(weights[0].weight, 179.0);
  }
}
