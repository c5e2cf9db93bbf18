use crate::db::AppState;
use crate::models::{ProfileUpdate, UserProfile};
use crate::plan::PlanError;
use crate::store;

/// ---------------------------------------------------------------------------
/// Profile Commands
/// ---------------------------------------------------------------------------

/// Create the placeholder profile for a new account
pub async fn sign_up(state: &AppState, user_id: &str, name: &str) -> Result<UserProfile, String> {
  let profile = UserProfile::placeholder(user_id, name);
  store::create_profile(&state.db, &profile)
    .await
    .map_err(|e| format!("Failed to create profile: {}", e))?;

  tracing::info!(user_id, "profile created");
  Ok(profile)
}

pub async fn get_profile(state: &AppState, user_id: &str) -> Result<UserProfile, String> {
  store::load_profile(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to load profile: {}", e))
}

/// Apply a settings edit. Weight and timeline are frozen while a plan is active.
pub async fn update_profile(
  state: &AppState,
  user_id: &str,
  update: ProfileUpdate,
) -> Result<UserProfile, String> {
  let mut profile = get_profile(state, user_id).await?;

  if profile.has_completed_macro_setup && update.touches_plan_fields() {
    return Err(PlanError::PlanLocked.to_string());
  }

  if let Some(name) = update.name {
    profile.name = name;
  }
  if let Some(age) = update.age {
    profile.age = age;
  }
  if let Some(gender) = update.gender {
    profile.gender = gender;
  }
  if let Some(other_goals) = update.other_goals {
    profile.other_goals = other_goals;
  }
  if let Some(weight) = update.initial_weight {
    profile.initial_weight = weight;
  }
  if let Some(weight) = update.goal_weight {
    profile.goal_weight = weight;
  }
  if let Some(target) = update.transformation_target {
    profile.transformation_target = target;
  }

  store::save_profile(&state.db, &profile)
    .await
    .map_err(|e| format!("Failed to save profile: {}", e))?;

  Ok(profile)
}
