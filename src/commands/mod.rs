//! Service layer: the operations the outer surface (CLI, UI) calls.
//!
//! Every command takes the shared `AppState` and a user id, and reports
//! failures as display strings.

pub mod nutrition;
pub mod profile;
pub mod tracking;
pub mod workouts;
