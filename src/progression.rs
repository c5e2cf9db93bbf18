//! Week-Based Workout Progression
//!
//! Each exercise template carries a base prescription (sets, reps, weight)
//! and optional per-week overrides. A session resolves the prescription for
//! the workout's next week and pre-fills the set list from it.
//!
//! Key principles:
//! - The workout week comes from the last completed session, not the calendar
//! - Workout weeks cycle 1..=12, independent of the nutrition plan length
//! - Malformed template data degrades to safe defaults instead of failing
//! - Finished sessions are stored as snapshots, never linked to the template

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Exercise, ProgressionOverride, RepScheme, ResolvedExercise, SetPerformance, Workout,
    WorkoutLogEntry, WorkoutSession, WorkoutSnapshot,
};

/// Last week before a workout's progression starts over at week 1
pub const PROGRESSION_CEILING_WEEK: u32 = 12;

/// Most working sets a single exercise may prescribe
pub const MAX_SETS: u32 = 100;

// ---------------------------------------------------------------------------
/// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum ProgressionError {
    #[error("Exercise {exercise} has more than one override for week {week}")]
    DuplicateWeek { exercise: String, week: u32 },

    #[error("Exercise {exercise} has an override for week {week}; weeks start at 1")]
    InvalidWeek { exercise: String, week: u32 },

    #[error("Exercise {exercise} prescribes {sets} sets; the limit is 100")]
    TooManySets { exercise: String, sets: i64 },

    #[error("Workout not found: {0}")]
    WorkoutNotFound(String),
}

// ---------------------------------------------------------------------------
/// Week selection
// ---------------------------------------------------------------------------

/// Week to run next, given the most recent completed session of this workout
pub fn next_week(last_log: Option<&WorkoutLogEntry>) -> u32 {
    match last_log {
        Some(log) if log.week_completed < PROGRESSION_CEILING_WEEK => log.week_completed + 1,
        _ => 1,
    }
}

// ---------------------------------------------------------------------------
/// Prescription resolution
// ---------------------------------------------------------------------------

/// First override for `week`. Duplicates are rejected on write; if old data
/// still has them, the first one wins.
pub fn override_for_week(exercise: &Exercise, week: u32) -> Option<&ProgressionOverride> {
    exercise.progression.iter().find(|p| p.week == week)
}

/// Numeric rep target for pre-filling sets: "8-12" -> 8, "10" -> 10, "AMRAP" -> None
pub fn rep_target(reps: Option<&RepScheme>) -> Option<u32> {
    match reps? {
        RepScheme::Count(n) => u32::try_from(*n).ok(),
        RepScheme::Text(text) => {
            let head = text.split('-').next().unwrap_or_default().trim();
            head.parse().ok()
        }
    }
}

/// Effective prescription for one exercise in `week`
pub fn resolve_exercise(exercise: &Exercise, week: u32) -> ResolvedExercise {
    let week_override = override_for_week(exercise, week);

    let sets = week_override
        .and_then(|p| p.sets)
        .or(exercise.sets)
        .and_then(|s| u32::try_from(s).ok())
        .filter(|s| *s > 0)
        .unwrap_or(1)
        .min(MAX_SETS);

    let reps = week_override
        .and_then(|p| p.reps.clone())
        .or_else(|| exercise.reps.clone());

    let weight = week_override.and_then(|p| p.weight).or(exercise.weight);

    let target = rep_target(reps.as_ref());
    let performance = (0..sets)
        .map(|_| SetPerformance {
            reps: target,
            weight,
            completed: false,
        })
        .collect();

    ResolvedExercise {
        exercise_id: exercise.id.clone(),
        name: exercise.name.clone(),
        sets,
        reps,
        weight,
        notes: exercise.notes.clone(),
        performance,
    }
}

/// Resolve every exercise of a workout for `week`, keeping template order
pub fn resolve_workout(workout: &Workout, week: u32) -> Vec<ResolvedExercise> {
    workout
        .exercises
        .iter()
        .map(|ex| resolve_exercise(ex, week))
        .collect()
}

// ---------------------------------------------------------------------------
/// Sessions
// ---------------------------------------------------------------------------

/// Open a session for the workout's next week
pub fn start_session(
    workout: &Workout,
    program_name: &str,
    last_log: Option<&WorkoutLogEntry>,
) -> WorkoutSession {
    let week = next_week(last_log);
    WorkoutSession {
        workout_id: workout.id.clone(),
        workout_name: workout.name.clone(),
        program_name: program_name.to_string(),
        week,
        exercises: resolve_workout(workout, week),
    }
}

/// Close a session into an immutable log entry
pub fn finish_session(session: WorkoutSession, completed_at: DateTime<Utc>) -> WorkoutLogEntry {
    WorkoutLogEntry {
        log_id: Uuid::new_v4().to_string(),
        workout_id: session.workout_id.clone(),
        program_name: session.program_name,
        completed_at,
        workout_snapshot: WorkoutSnapshot {
            workout_id: session.workout_id,
            name: session.workout_name,
            exercises: session.exercises,
        },
        week_completed: session.week,
    }
}

// ---------------------------------------------------------------------------
/// Write-time validation
// ---------------------------------------------------------------------------

/// At most one override per week, weeks are 1-based and set counts stay
/// within `MAX_SETS`
pub fn validate_progression(exercise: &Exercise) -> Result<(), ProgressionError> {
    let set_counts = exercise
        .sets
        .into_iter()
        .chain(exercise.progression.iter().filter_map(|p| p.sets));
    for sets in set_counts {
        if sets > i64::from(MAX_SETS) {
            return Err(ProgressionError::TooManySets {
                exercise: exercise.name.clone(),
                sets,
            });
        }
    }

    let mut seen = std::collections::HashSet::new();
    for p in &exercise.progression {
        if p.week == 0 {
            return Err(ProgressionError::InvalidWeek {
                exercise: exercise.name.clone(),
                week: p.week,
            });
        }
        if !seen.insert(p.week) {
            return Err(ProgressionError::DuplicateWeek {
                exercise: exercise.name.clone(),
                week: p.week,
            });
        }
    }
    Ok(())
}

pub fn validate_workouts(workouts: &[Workout]) -> Result<(), ProgressionError> {
    workouts
        .iter()
        .flat_map(|w| w.exercises.iter())
        .try_for_each(validate_progression)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
