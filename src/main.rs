use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use protracker_lib::commands::{nutrition, profile, tracking, workouts};
use protracker_lib::config::AppConfig;
use protracker_lib::db::{self, AppState};
use protracker_lib::llm::ProgramRequest;
use protracker_lib::models::{
  Gender, MacroTotals, MealType, NewMealEntry, NewWeightEntry, TransformationTarget, WorkoutSession,
};
use protracker_lib::plan::PlanInput;

#[derive(Parser)]
#[command(name = "protracker", version, about = "Macro plans, workout progression and daily tracking")]
struct Cli {
  /// Account to act on
  #[arg(long, global = true, default_value = "local")]
  user: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(clap::Args)]
struct PlanArgs {
  #[arg(long)]
  initial_weight: f64,
  #[arg(long)]
  goal_weight: f64,
  /// 8, 12 or 16
  #[arg(long, default_value_t = 12)]
  weeks: u32,
  #[arg(long)]
  age: u32,
  /// male or female
  #[arg(long)]
  gender: Gender,
}

impl PlanArgs {
  fn into_input(self) -> Result<PlanInput, String> {
    Ok(PlanInput {
      initial_weight: self.initial_weight,
      goal_weight: self.goal_weight,
      transformation_target: TransformationTarget::try_from(self.weeks)?,
      age: self.age,
      gender: self.gender,
    })
  }
}

#[derive(Subcommand)]
enum Command {
  /// Create the profile for --user
  SignUp {
    #[arg(long)]
    name: String,
  },
  /// Print a weekly macro plan without storing it
  Plan(PlanArgs),
  /// Store a macro plan and unlock the dashboard
  Setup(PlanArgs),
  /// Drop the active macro plan
  ResetPlan,
  /// Targets, intake and weight for a day
  Today {
    /// Defaults to today (UTC)
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  LogWeight {
    weight: f64,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    notes: Option<String>,
  },
  LogMeal {
    food: String,
    #[arg(long, default_value = "snack")]
    meal: MealType,
    /// Servings eaten; ignored when --grams is given
    #[arg(long, default_value_t = 1.0)]
    servings: f64,
    #[arg(long, requires = "serving_size")]
    grams: Option<f64>,
    /// Grams per serving, used with --grams
    #[arg(long)]
    serving_size: Option<f64>,
    #[arg(long)]
    calories: f64,
    #[arg(long, default_value_t = 0.0)]
    protein: f64,
    #[arg(long, default_value_t = 0.0)]
    carbs: f64,
    #[arg(long, default_value_t = 0.0)]
    fats: f64,
    #[arg(long)]
    date: Option<NaiveDate>,
  },
  /// Print the next session of a workout with this week's prescription
  StartWorkout {
    program_id: String,
    workout_id: String,
  },
  /// Log a session previously printed by start-workout
  FinishWorkout {
    /// Path to the session JSON
    session: std::path::PathBuf,
  },
  ListPrograms,
  GenerateProgram {
    /// e.g. "build muscle while keeping running fitness"
    goals: String,
    #[arg(long, default_value_t = 4)]
    days: u8,
    #[arg(long, default_value = "intermediate")]
    experience: String,
    #[arg(long, value_delimiter = ',')]
    equipment: Vec<String>,
    #[arg(long)]
    minutes: Option<u32>,
  },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
  let out = serde_json::to_string_pretty(value).map_err(|e| format!("Failed to encode output: {}", e))?;
  println!("{}", out);
  Ok(())
}

async fn run(state: &AppState, user: &str, command: Command) -> Result<(), String> {
  let today = Utc::now().date_naive();

  match command {
    Command::SignUp { name } => print_json(&profile::sign_up(state, user, &name).await?),
    Command::Plan(args) => print_json(&nutrition::preview_plan(state, &args.into_input()?)?),
    Command::Setup(args) => print_json(&nutrition::complete_setup(state, user, args.into_input()?).await?),
    Command::ResetPlan => print_json(&nutrition::reset_plan(state, user).await?),
    Command::Today { date } => {
      print_json(&tracking::get_daily_summary(state, user, date.unwrap_or(today)).await?)
    }
    Command::LogWeight { weight, date, notes } => {
      let entry = NewWeightEntry {
        logged_on: date.unwrap_or(today),
        weight,
        notes,
      };
      let id = tracking::log_weight(state, user, entry).await?;
      print_json(&serde_json::json!({ "id": id }))
    }
    Command::LogMeal {
      food,
      meal,
      servings,
      grams,
      serving_size,
      calories,
      protein,
      carbs,
      fats,
      date,
    } => {
      let servings = match (grams, serving_size) {
        (Some(grams), Some(size)) => protracker_lib::tracking::servings_from_grams(grams, size)
          .ok_or_else(|| "Serving size must be positive".to_string())?,
        _ => servings,
      };
      let entry = NewMealEntry {
        eaten_on: date.unwrap_or(today),
        meal_type: meal,
        food_name: food,
        servings,
        per_serving: MacroTotals {
          calories,
          protein,
          carbs,
          fats,
        },
      };
      let id = tracking::log_meal(state, user, entry).await?;
      print_json(&serde_json::json!({ "id": id }))
    }
    Command::StartWorkout { program_id, workout_id } => {
      print_json(&workouts::start_workout(state, user, &program_id, &workout_id).await?)
    }
    Command::FinishWorkout { session } => {
      let raw = std::fs::read_to_string(&session)
        .map_err(|e| format!("Failed to read {}: {}", session.display(), e))?;
      let session: WorkoutSession =
        serde_json::from_str(&raw).map_err(|e| format!("Invalid session file: {}", e))?;
      print_json(&workouts::finish_workout(state, user, session).await?)
    }
    Command::ListPrograms => print_json(&workouts::list_programs(state, user).await?),
    Command::GenerateProgram {
      goals,
      days,
      experience,
      equipment,
      minutes,
    } => {
      let other_goals = Some(profile::get_profile(state, user).await?.other_goals).filter(|g| !g.is_empty());
      let request = ProgramRequest {
        goals,
        days_per_week: days,
        experience,
        equipment,
        session_minutes: minutes,
        other_goals,
      };
      print_json(&workouts::generate_program(state, user, request).await?)
    }
  }
}

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();

  let config = match AppConfig::from_env() {
    Ok(config) => config,
    Err(e) => {
      eprintln!("{}", e);
      std::process::exit(2);
    }
  };

  let db = match db::initialize_db(&config.database_url).await {
    Ok(pool) => pool,
    Err(e) => {
      eprintln!("Failed to initialize database: {}", e);
      std::process::exit(1);
    }
  };

  let state = AppState { db, config };
  if let Err(e) = run(&state, &cli.user, cli.command).await {
    tracing::error!(error = %e, "command failed");
    eprintln!("{}", e);
    std::process::exit(1);
  }
}
