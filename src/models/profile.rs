use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  pub fn as_str(&self) -> &'static str {
    match self {
      Gender::Male => "male",
      Gender::Female => "female",
    }
  }
}

impl std::str::FromStr for Gender {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "male" => Ok(Self::Male),
      "female" => Ok(Self::Female),
      _ => Err(format!("Unknown gender: {}", s)),
    }
  }
}

/// Length of a nutrition plan. Only these three timelines are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum TransformationTarget {
  Weeks8,
  #[default]
  Weeks12,
  Weeks16,
}

impl TransformationTarget {
  pub fn weeks(&self) -> u32 {
    match self {
      Self::Weeks8 => 8,
      Self::Weeks12 => 12,
      Self::Weeks16 => 16,
    }
  }
}

impl TryFrom<u32> for TransformationTarget {
  type Error = String;
  fn try_from(weeks: u32) -> Result<Self, Self::Error> {
    match weeks {
      8 => Ok(Self::Weeks8),
      12 => Ok(Self::Weeks12),
      16 => Ok(Self::Weeks16),
      other => Err(format!(
        "Unsupported transformation target: {} weeks (expected 8, 12 or 16)",
        other
      )),
    }
  }
}

impl From<TransformationTarget> for u32 {
  fn from(target: TransformationTarget) -> Self {
    target.weeks()
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id: String,
  pub name: String,
  pub age: u32,
  pub gender: Gender,
  /// Pounds
  pub initial_weight: f64,
  /// Pounds
  pub goal_weight: f64,
  pub transformation_target: TransformationTarget,
  pub target_date: Option<DateTime<Utc>>,
  /// Gate for the dashboard; weight and timeline are locked while true
  pub has_completed_macro_setup: bool,
  pub other_goals: String,
}

impl UserProfile {
  /// Placeholder profile written at signup, before macro setup
  pub fn placeholder(user_id: &str, name: &str) -> Self {
    Self {
      user_id: user_id.to_string(),
      name: name.to_string(),
      age: 30,
      gender: Gender::Male,
      initial_weight: 0.0,
      goal_weight: 0.0,
      transformation_target: TransformationTarget::default(),
      target_date: None,
      has_completed_macro_setup: false,
      other_goals: String::new(),
    }
  }
}

/// Settings edit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
  pub name: Option<String>,
  pub age: Option<u32>,
  pub gender: Option<Gender>,
  pub other_goals: Option<String>,
  pub initial_weight: Option<f64>,
  pub goal_weight: Option<f64>,
  pub transformation_target: Option<TransformationTarget>,
}

impl ProfileUpdate {
  /// True when the update touches fields that are frozen once a plan is active
  pub fn touches_plan_fields(&self) -> bool {
    self.initial_weight.is_some()
      || self.goal_weight.is_some()
      || self.transformation_target.is_some()
  }
}
