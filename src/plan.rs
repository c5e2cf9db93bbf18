//! Nutrition Plan Engine
//!
//! Turns a profile (weights, age, gender, timeline) into a fixed sequence of
//! weekly macro targets, and picks the week that is in effect today.
//!
//! Key principles:
//! - The plan is computed once at setup and stored whole
//! - Calories step every 4 weeks in the plan's direction
//! - Protein is pinned to goal weight for the whole plan
//! - Elapsed time past either end of the plan clamps, it never expires

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::models::{Gender, MacroPlan, TransformationTarget, UserProfile, WeeklyMacroGoal};
use crate::store::{self, StoreError};

// ---------------------------------------------------------------------------
/// Formula constants
// ---------------------------------------------------------------------------

const LB_PER_KG: f64 = 2.20462;
/// Heights are not collected; the formula uses fixed placeholders
const MALE_HEIGHT_CM: f64 = 178.0;
const FEMALE_HEIGHT_CM: f64 = 165.0;
const ACTIVITY_MULTIPLIER: f64 = 1.55;
const CUTTING_DEFICIT: f64 = 500.0;
const GAINING_SURPLUS: f64 = 300.0;
const STEP_CALORIES: f64 = 75.0;
const WEEKS_PER_STEP: u32 = 4;
const PROTEIN_G_PER_LB_GOAL: f64 = 1.0;
const FAT_CALORIE_SHARE: f64 = 0.25;

const MIN_WEIGHT_LB: f64 = 50.0;
const MAX_WEIGHT_LB: f64 = 1000.0;
const MIN_AGE: u32 = 13;
const MAX_AGE: u32 = 120;

// ---------------------------------------------------------------------------
/// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid profile data: {0}")]
    InvalidProfileData(String),

    #[error("A macro plan is already active; reset it before changing weight or timeline")]
    PlanLocked,

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
/// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInput {
    /// Pounds
    pub initial_weight: f64,
    /// Pounds
    pub goal_weight: f64,
    pub transformation_target: TransformationTarget,
    pub age: u32,
    pub gender: Gender,
}

impl PlanInput {
    pub fn validate(&self) -> Result<(), PlanError> {
        for (label, value) in [
            ("initial weight", self.initial_weight),
            ("goal weight", self.goal_weight),
        ] {
            if !value.is_finite() || !(MIN_WEIGHT_LB..=MAX_WEIGHT_LB).contains(&value) {
                return Err(PlanError::InvalidProfileData(format!(
                    "{} must be between {} and {} lb, got {}",
                    label, MIN_WEIGHT_LB, MAX_WEIGHT_LB, value
                )));
            }
        }
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(PlanError::InvalidProfileData(format!(
                "age must be between {} and {}, got {}",
                MIN_AGE, MAX_AGE, self.age
            )));
        }
        Ok(())
    }

    pub fn direction(&self) -> PlanDirection {
        if self.goal_weight < self.initial_weight {
            PlanDirection::Cutting
        } else {
            PlanDirection::Gaining
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanDirection {
    Cutting,
    /// Includes maintaining the current weight
    Gaining,
}

impl PlanDirection {
    fn step_sign(&self) -> f64 {
        match self {
            Self::Cutting => -1.0,
            Self::Gaining => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlanOptions {
    /// Weekly calories are never planned below this. None keeps the raw formula.
    pub calorie_floor: Option<i64>,
}

// ---------------------------------------------------------------------------
/// Plan Calculator
// ---------------------------------------------------------------------------

/// Harris-Benedict (revised) BMR in kcal/day
pub fn basal_metabolic_rate(weight_lb: f64, age: u32, gender: Gender) -> f64 {
    let weight_kg = weight_lb / LB_PER_KG;
    let age = age as f64;
    match gender {
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * MALE_HEIGHT_CM - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * FEMALE_HEIGHT_CM - 4.330 * age,
    }
}

pub fn maintenance_calories(weight_lb: f64, age: u32, gender: Gender) -> f64 {
    basal_metabolic_rate(weight_lb, age, gender) * ACTIVITY_MULTIPLIER
}

/// Calories for the first block of the plan, before rounding
pub fn starting_calories(input: &PlanInput) -> f64 {
    let maintenance = maintenance_calories(input.initial_weight, input.age, input.gender);
    match input.direction() {
        PlanDirection::Cutting => maintenance - CUTTING_DEFICIT,
        PlanDirection::Gaining => maintenance + GAINING_SURPLUS,
    }
}

/// Split a calorie target into macros. Carbs take whatever the rounded
/// protein and fat grams leave, so the grams add back up to within 2 kcal.
///
/// Carb calories subtract the rounded fat grams (`fats * 9`), not the raw
/// 25% fat share. That can move carbs by a gram against the unrounded
/// formula (180 -> 170 lb week 1: 279 g instead of 278 g).
pub fn split_macros(week: u32, calories: i64, goal_weight: f64) -> WeeklyMacroGoal {
    let protein = (goal_weight * PROTEIN_G_PER_LB_GOAL).round() as i64;
    let fat_calories = calories as f64 * FAT_CALORIE_SHARE;
    let fats = (fat_calories / 9.0).round() as i64;
    let carb_calories = calories - protein * 4 - fats * 9;
    let carbs = (carb_calories as f64 / 4.0).round() as i64;

    WeeklyMacroGoal {
        week,
        calories,
        protein,
        carbs,
        fats,
    }
}

/// Compute the full weekly plan. Pure; the caller stores the result.
pub fn calculate_weekly_plan(
    input: &PlanInput,
    options: &PlanOptions,
) -> Result<Vec<WeeklyMacroGoal>, PlanError> {
    input.validate()?;

    let start = starting_calories(input);
    let sign = input.direction().step_sign();
    let weeks = input.transformation_target.weeks();

    let plan = (0..weeks)
        .map(|i| {
            let step = (i / WEEKS_PER_STEP) as f64 * STEP_CALORIES * sign;
            let mut calories = ((start + step) / 10.0).round() as i64 * 10;
            if let Some(floor) = options.calorie_floor {
                calories = calories.max(floor);
            }
            split_macros(i + 1, calories, input.goal_weight)
        })
        .collect();

    Ok(plan)
}

// ---------------------------------------------------------------------------
/// Active-Week Selector
// ---------------------------------------------------------------------------

/// Zero-based plan index for `now`, clamped to the plan. None for an empty plan.
pub fn active_week_index(start_date: DateTime<Utc>, plan_len: usize, now: DateTime<Utc>) -> Option<usize> {
    if plan_len == 0 {
        return None;
    }
    let weeks_since_start = (now - start_date).num_weeks();
    let last = (plan_len - 1) as i64;
    Some(weeks_since_start.clamp(0, last) as usize)
}

/// The goal in effect at `now`. An empty plan means "no active goals".
pub fn active_week_goal(plan: &MacroPlan, now: DateTime<Utc>) -> Option<&WeeklyMacroGoal> {
    active_week_index(plan.start_date, plan.plan.len(), now).and_then(|i| plan.plan.get(i))
}

// ---------------------------------------------------------------------------
// Setup flow
// ---------------------------------------------------------------------------

/// Complete macro setup: write the plan fields to the profile, open the
/// dashboard gate and store the freshly computed plan, all in one transaction.
pub async fn complete_macro_setup(
    pool: &SqlitePool,
    user_id: &str,
    input: &PlanInput,
    options: &PlanOptions,
    now: DateTime<Utc>,
) -> Result<MacroPlan, PlanError> {
    let mut profile = store::load_profile(pool, user_id).await?;
    if profile.has_completed_macro_setup {
        return Err(PlanError::PlanLocked);
    }

    let weekly = calculate_weekly_plan(input, options)?;
    let plan = MacroPlan {
        start_date: now,
        plan: weekly,
    };

    profile.initial_weight = input.initial_weight;
    profile.goal_weight = input.goal_weight;
    profile.transformation_target = input.transformation_target;
    profile.age = input.age;
    profile.gender = input.gender;
    profile.target_date = Some(now + Duration::weeks(input.transformation_target.weeks() as i64));
    profile.has_completed_macro_setup = true;

    store::save_profile_with_plan(pool, &profile, &plan).await?;

    tracing::info!(
        user_id,
        weeks = plan.plan.len(),
        direction = ?input.direction(),
        "macro plan created"
    );

    Ok(plan)
}

/// Drop the active plan and reopen the profile's weight/timeline fields
pub async fn reset_macro_plan(pool: &SqlitePool, user_id: &str) -> Result<UserProfile, PlanError> {
    let mut profile = store::load_profile(pool, user_id).await?;
    profile.has_completed_macro_setup = false;
    profile.target_date = None;
    store::clear_plan(pool, &profile).await?;

    tracing::info!(user_id, "macro plan reset");
    Ok(profile)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
