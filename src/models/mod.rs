pub mod nutrition;
pub mod profile;
pub mod tracking;
pub mod workout;

pub use nutrition::{MacroPlan, MacroTotals, WeeklyMacroGoal};
pub use profile::{Gender, ProfileUpdate, TransformationTarget, UserProfile};
pub use tracking::{
  CheckIn, MealEntry, MealType, NewCheckIn, NewMealEntry, NewSleepEntry, NewWeightEntry,
  SleepEntry, WeightEntry,
};
pub use workout::{
  Exercise, ProgressionOverride, Program, RepScheme, ResolvedExercise, SetPerformance, Workout,
  WorkoutLogEntry, WorkoutSession, WorkoutSnapshot,
};
