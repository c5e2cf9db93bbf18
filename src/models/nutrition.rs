use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Daily targets for one week of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyMacroGoal {
  /// 1-based
  pub week: u32,
  pub calories: i64,
  pub protein: i64,
  pub carbs: i64,
  pub fats: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroPlan {
  pub start_date: DateTime<Utc>,
  pub plan: Vec<WeeklyMacroGoal>,
}

/// Calories and macros as logged (fractional servings allowed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
  pub calories: f64,
  pub protein: f64,
  pub carbs: f64,
  pub fats: f64,
}

impl MacroTotals {
  pub fn add(&mut self, other: &MacroTotals) {
    self.calories += other.calories;
    self.protein += other.protein;
    self.carbs += other.carbs;
    self.fats += other.fats;
  }

  /// Target minus consumed. Negative values mean the target was exceeded.
  pub fn remaining_from(goal: &WeeklyMacroGoal, consumed: &MacroTotals) -> Self {
    Self {
      calories: goal.calories as f64 - consumed.calories,
      protein: goal.protein as f64 - consumed.protein,
      carbs: goal.carbs as f64 - consumed.carbs,
      fats: goal.fats as f64 - consumed.fats,
    }
  }
}
