use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Reps as entered: a plain count or free text such as "8-12" or "AMRAP"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepScheme {
  Count(i64),
  Text(String),
}

impl std::fmt::Display for RepScheme {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Count(n) => write!(f, "{}", n),
      Self::Text(s) => write!(f, "{}", s),
    }
  }
}

impl From<&str> for RepScheme {
  fn from(s: &str) -> Self {
    Self::Text(s.to_string())
  }
}

/// Week-specific replacement for an exercise's base prescription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionOverride {
  pub week: u32,
  #[serde(default, deserialize_with = "lenient::int")]
  pub sets: Option<i64>,
  #[serde(default)]
  pub reps: Option<RepScheme>,
  #[serde(default, deserialize_with = "lenient::float")]
  pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
  /// Empty until the program is stored
  #[serde(default)]
  pub id: String,
  pub name: String,
  #[serde(default, deserialize_with = "lenient::int")]
  pub sets: Option<i64>,
  #[serde(default)]
  pub reps: Option<RepScheme>,
  #[serde(default, deserialize_with = "lenient::float")]
  pub weight: Option<f64>,
  #[serde(default)]
  pub notes: Option<String>,
  #[serde(default)]
  pub progression: Vec<ProgressionOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
  #[serde(default)]
  pub id: String,
  pub name: String,
  pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
  pub id: String,
  pub user_id: String,
  pub name: String,
  pub description: Option<String>,
  pub workouts: Vec<Workout>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Program {
  pub fn find_workout(&self, workout_id: &str) -> Option<&Workout> {
    self.workouts.iter().find(|w| w.id == workout_id)
  }
}

/// One set as planned and then performed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPerformance {
  pub reps: Option<u32>,
  pub weight: Option<f64>,
  pub completed: bool,
}

/// Exercise with the prescription in effect for one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedExercise {
  pub exercise_id: String,
  pub name: String,
  pub sets: u32,
  pub reps: Option<RepScheme>,
  pub weight: Option<f64>,
  pub notes: Option<String>,
  pub performance: Vec<SetPerformance>,
}

/// Session in progress; lives only until it is finished or abandoned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
  pub workout_id: String,
  pub workout_name: String,
  pub program_name: String,
  pub week: u32,
  pub exercises: Vec<ResolvedExercise>,
}

/// Snapshot of a session as performed, decoupled from later template edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSnapshot {
  pub workout_id: String,
  pub name: String,
  pub exercises: Vec<ResolvedExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLogEntry {
  pub log_id: String,
  pub workout_id: String,
  pub program_name: String,
  pub completed_at: DateTime<Utc>,
  pub workout_snapshot: WorkoutSnapshot,
  pub week_completed: u32,
}

/// Numeric fields arrive from forms and generated programs as numbers,
/// numeric strings, empty strings or junk. Junk becomes `None`.
mod lenient {
  use super::*;

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
  }

  pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value: Option<Loose> = Option::deserialize(d)?;
    Ok(match value {
      Some(Loose::Int(n)) => Some(n),
      Some(Loose::Float(f)) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
      Some(Loose::Text(s)) => s.trim().parse().ok(),
      _ => None,
    })
  }

  pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value: Option<Loose> = Option::deserialize(d)?;
    Ok(match value {
      Some(Loose::Int(n)) => Some(n as f64),
      Some(Loose::Float(f)) if f.is_finite() => Some(f),
      Some(Loose::Text(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
      _ => None,
    })
  }
}
