//! LLM integration for workout program generation
//!
//! This module handles communication with the Claude API. The model only
//! drafts the program; ids, validation and storage stay on our side.

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{Exercise, Program, Workout};
use crate::progression::{validate_workouts, ProgressionError};

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const MESSAGES_PATH: &str = "v1/messages";
const CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
const PROGRAM_MAX_TOKENS: u32 = 4096;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Serialize)]
pub enum LlmError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),

  #[error("Generated program rejected: {0}")]
  Invalid(String),
}

impl From<ProgressionError> for LlmError {
  fn from(e: ProgressionError) -> Self {
    LlmError::Invalid(e.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Claude API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClaudeRequest {
  model: String,
  max_tokens: u32,
  system: String,
  messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
  role: String,
  content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
  content: Vec<ContentBlock>,
  usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  content_type: String,
  text: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
  pub input_tokens: u32,
  pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
  error: ClaudeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Program Generation Types
/// ---------------------------------------------------------------------------

/// What the athlete asked for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRequest {
  pub goals: String,
  pub days_per_week: u8,
  pub experience: String,
  pub equipment: Vec<String>,
  pub session_minutes: Option<u32>,
  /// Free text from the profile, e.g. "run a half marathon in the spring"
  pub other_goals: Option<String>,
}

/// Program as drafted by the model, before ids are assigned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedProgram {
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub workouts: Vec<Workout>,
}

impl GeneratedProgram {
  /// Give every workout and exercise a fresh id and attach the program to a user
  pub fn into_program(self, user_id: &str) -> Program {
    let now = Utc::now();
    let workouts = self
      .workouts
      .into_iter()
      .map(|w| Workout {
        id: Uuid::new_v4().to_string(),
        name: w.name,
        exercises: w
          .exercises
          .into_iter()
          .map(|ex| Exercise {
            id: Uuid::new_v4().to_string(),
            ..ex
          })
          .collect(),
      })
      .collect();

    Program {
      id: Uuid::new_v4().to_string(),
      user_id: user_id.to_string(),
      name: self.name,
      description: self.description,
      workouts,
      created_at: now,
      updated_at: now,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Claude Client
/// ---------------------------------------------------------------------------

pub struct ClaudeClient {
  client: Client,
  api_key: String,
  messages_url: Url,
}

impl ClaudeClient {
  pub fn new(api_key: &str, base_url: &Url) -> Result<Self, LlmError> {
    let messages_url = base_url
      .join(MESSAGES_PATH)
      .map_err(|e| LlmError::Request(format!("Invalid base URL: {}", e)))?;

    Ok(Self {
      client: Client::new(),
      api_key: api_key.to_string(),
      messages_url,
    })
  }

  pub fn from_config(config: &AppConfig) -> Result<Self, LlmError> {
    let api_key = config.anthropic_api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
    Self::new(api_key, &config.llm_base_url)
  }

  /// Call Claude with a system prompt and user message
  pub async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
  ) -> Result<(String, Usage), LlmError> {
    let request = ClaudeRequest {
      model: CLAUDE_MODEL.to_string(),
      max_tokens,
      system: system_prompt.to_string(),
      messages: vec![ClaudeMessage {
        role: "user".to_string(),
        content: user_message.to_string(),
      }],
    };

    let response = self
      .client
      .post(self.messages_url.clone())
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", API_VERSION)
      .header("content-type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      if let Ok(error_resp) = serde_json::from_str::<ClaudeErrorResponse>(&body) {
        return Err(LlmError::Api(error_resp.error.message));
      }
      return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
    }

    let claude_response: ClaudeResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    let text = claude_response
      .content
      .iter()
      .find(|c| c.content_type == "text")
      .and_then(|c| c.text.clone())
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))?;

    Ok((text, claude_response.usage))
  }

  /// Draft a program for the request and validate its progression overrides
  pub async fn generate_program(
    &self,
    user_id: &str,
    request: &ProgramRequest,
  ) -> Result<(Program, Usage), LlmError> {
    let system_prompt = include_str!("prompts/program_system.txt");

    let request_json =
      serde_json::to_string_pretty(request).map_err(|e| LlmError::Parse(e.to_string()))?;
    let user_message = format!(
      r#"Design a training program for this athlete.

ATHLETE REQUEST:
{}

Respond with valid JSON matching the OUTPUT FORMAT specified in your instructions."#,
      request_json
    );

    let (response_text, usage) = self
      .complete(system_prompt, &user_message, PROGRAM_MAX_TOKENS)
      .await?;

    let json_str = extract_json(&response_text)?;
    let generated: GeneratedProgram =
      serde_json::from_str(&json_str).map_err(|e| LlmError::Parse(format!("{}: {}", e, json_str)))?;

    if generated.workouts.is_empty() {
      return Err(LlmError::Invalid("program has no workouts".to_string()));
    }
    validate_workouts(&generated.workouts)?;

    tracing::info!(
      user_id,
      workouts = generated.workouts.len(),
      input_tokens = usage.input_tokens,
      output_tokens = usage.output_tokens,
      "program generated"
    );

    Ok((generated.into_program(user_id), usage))
  }
}

/// Extract JSON from Claude's response (handles markdown code blocks)
fn extract_json(text: &str) -> Result<String, LlmError> {
  if text.trim().starts_with('{') {
    return Ok(text.trim().to_string());
  }

  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  if let Some(start) = text.find("```") {
    let start = start + 3;
    // Skip language identifier if present
    let content_start = text[start..]
      .find('\n')
      .map(|i| start + i + 1)
      .unwrap_or(start);
    if let Some(end) = text[content_start..].find("```") {
      return Ok(text[content_start..content_start + end].trim().to_string());
    }
  }

  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    if start < end {
      return Ok(text[start..=end].to_string());
    }
  }

  Err(LlmError::Parse("Could not extract JSON from response".to_string()))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
