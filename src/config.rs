//! Runtime configuration from the environment (and `.env`, loaded by the binary)

use std::env;
use thiserror::Error;
use url::Url;

use crate::plan::PlanOptions;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://protracker.db?mode=rwc";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Invalid value for {name}: {reason}")]
  Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,
  pub anthropic_api_key: Option<String>,
  pub llm_base_url: Url,
  /// Lowest weekly calorie target a new plan may contain
  pub calorie_floor: Option<i64>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let database_url = non_empty("PROTRACKER_DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
    let anthropic_api_key = non_empty("ANTHROPIC_API_KEY");

    let raw_base = non_empty("PROTRACKER_LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string());
    let mut llm_base_url = Url::parse(&raw_base).map_err(|e| ConfigError::Invalid {
      name: "PROTRACKER_LLM_BASE_URL",
      reason: e.to_string(),
    })?;
    // `Url::join` replaces the last segment unless the path ends in a slash
    if !llm_base_url.path().ends_with('/') {
      let path = format!("{}/", llm_base_url.path());
      llm_base_url.set_path(&path);
    }

    let calorie_floor = match non_empty("PROTRACKER_CALORIE_FLOOR") {
      Some(raw) => {
        let floor: i64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
          name: "PROTRACKER_CALORIE_FLOOR",
          reason: format!("expected a whole number of calories, got {:?}", raw),
        })?;
        if floor <= 0 {
          return Err(ConfigError::Invalid {
            name: "PROTRACKER_CALORIE_FLOOR",
            reason: "must be positive".to_string(),
          });
        }
        Some(floor)
      }
      None => None,
    };

    Ok(Self {
      database_url,
      anthropic_api_key,
      llm_base_url,
      calorie_floor,
    })
  }

  pub fn plan_options(&self) -> PlanOptions {
    PlanOptions {
      calorie_floor: self.calorie_floor,
    }
  }
}

fn non_empty(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}
