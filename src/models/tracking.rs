use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::nutrition::MacroTotals;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WeightEntry {
  pub id: i64,
  pub user_id: String,
  pub logged_on: NaiveDate,
  /// Pounds
  pub weight: f64,
  pub notes: Option<String>,
}

/// For inserting new weight entries (without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWeightEntry {
  pub logged_on: NaiveDate,
  pub weight: f64,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
  Breakfast,
  Lunch,
  Dinner,
  Snack,
}

impl MealType {
  pub fn as_str(&self) -> &'static str {
    match self {
      MealType::Breakfast => "breakfast",
      MealType::Lunch => "lunch",
      MealType::Dinner => "dinner",
      MealType::Snack => "snack",
    }
  }
}

impl std::str::FromStr for MealType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "breakfast" => Ok(Self::Breakfast),
      "lunch" => Ok(Self::Lunch),
      "dinner" => Ok(Self::Dinner),
      "snack" => Ok(Self::Snack),
      _ => Err(format!("Unknown meal type: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntry {
  pub id: i64,
  pub user_id: String,
  pub eaten_on: NaiveDate,
  pub meal_type: MealType,
  pub food_name: String,
  pub servings: f64,
  /// Nutrition facts for a single serving
  pub per_serving: MacroTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMealEntry {
  pub eaten_on: NaiveDate,
  pub meal_type: MealType,
  pub food_name: String,
  pub servings: f64,
  pub per_serving: MacroTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SleepEntry {
  pub id: i64,
  pub user_id: String,
  pub night_of: NaiveDate,
  pub hours: f64,
  /// 1-5
  pub quality: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSleepEntry {
  pub night_of: NaiveDate,
  pub hours: f64,
  pub quality: Option<i64>,
}

/// Daily subjective check-in, scores 1-5
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CheckIn {
  pub id: i64,
  pub user_id: String,
  pub checked_on: NaiveDate,
  pub energy: i64,
  pub hunger: i64,
  pub adherence: i64,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheckIn {
  pub checked_on: NaiveDate,
  pub energy: i64,
  pub hunger: i64,
  pub adherence: i64,
  pub notes: Option<String>,
}
