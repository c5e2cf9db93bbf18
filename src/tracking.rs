//! Daily tracking: meal arithmetic and the dashboard summary
//!
//! Meals are logged as a number of servings of a food with per-serving
//! nutrition facts. The dashboard compares the day's totals against the
//! plan week in effect.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::models::{MacroPlan, MacroTotals, MealEntry, WeeklyMacroGoal, WeightEntry};
use crate::plan::active_week_goal;
use crate::store::{self, StoreError};

/// ---------------------------------------------------------------------------
/// Serving Arithmetic
/// ---------------------------------------------------------------------------

/// Servings represented by a gram amount of a food with the given serving size
pub fn servings_from_grams(grams: f64, serving_size_g: f64) -> Option<f64> {
  if serving_size_g > 0.0 && grams >= 0.0 {
    Some(grams / serving_size_g)
  } else {
    None
  }
}

/// Nutrition facts scaled to a number of servings
pub fn scale(per_serving: &MacroTotals, servings: f64) -> MacroTotals {
  MacroTotals {
    calories: per_serving.calories * servings,
    protein: per_serving.protein * servings,
    carbs: per_serving.carbs * servings,
    fats: per_serving.fats * servings,
  }
}

impl MealEntry {
  pub fn totals(&self) -> MacroTotals {
    scale(&self.per_serving, self.servings)
  }
}

pub fn daily_totals(meals: &[MealEntry]) -> MacroTotals {
  meals.iter().fold(MacroTotals::default(), |mut acc, meal| {
    acc.add(&meal.totals());
    acc
  })
}

/// ---------------------------------------------------------------------------
/// Dashboard
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
  pub date: NaiveDate,
  pub consumed: MacroTotals,
  /// None when the user has no active plan
  pub target: Option<WeeklyMacroGoal>,
  pub remaining: Option<MacroTotals>,
  pub meals_logged: usize,
  pub latest_weight: Option<f64>,
  /// Latest weight minus the plan's starting weight
  pub weight_change: Option<f64>,
}

/// Assemble the summary from already-loaded data
pub fn build_daily_summary(
  date: NaiveDate,
  meals: &[MealEntry],
  plan: Option<&MacroPlan>,
  now: DateTime<Utc>,
  latest_weight: Option<&WeightEntry>,
  initial_weight: Option<f64>,
) -> DailySummary {
  let consumed = daily_totals(meals);
  let target = plan.and_then(|p| active_week_goal(p, now)).copied();
  let remaining = target.as_ref().map(|goal| MacroTotals::remaining_from(goal, &consumed));
  let latest = latest_weight.map(|w| w.weight);
  let weight_change = match (latest, initial_weight) {
    (Some(current), Some(start)) if start > 0.0 => Some(current - start),
    _ => None,
  };

  DailySummary {
    date,
    consumed,
    target,
    remaining,
    meals_logged: meals.len(),
    latest_weight: latest,
    weight_change,
  }
}

/// Load everything the dashboard needs for one user and day
pub async fn load_daily_summary(
  pool: &SqlitePool,
  user_id: &str,
  date: NaiveDate,
  now: DateTime<Utc>,
) -> Result<DailySummary, StoreError> {
  let profile = store::load_profile(pool, user_id).await?;
  let meals = store::list_meals_on(pool, user_id, date).await?;
  let plan = store::load_macro_plan(pool, user_id).await?;
  let latest = store::latest_weight(pool, user_id, date).await?;
  let initial_weight = profile
    .has_completed_macro_setup
    .then_some(profile.initial_weight);

  Ok(build_daily_summary(
    date,
    &meals,
    plan.as_ref(),
    now,
    latest.as_ref(),
    initial_weight,
  ))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
