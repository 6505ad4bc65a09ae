//! fitplan - Daily workout and meal planner
//!
//! Ranks a catalog of workouts and meals against a user profile and lays the
//! picks out on a push/pull/legs week.

pub mod bot;
pub mod catalog;
pub mod db;
pub mod planner;
pub mod profile;
pub mod tui;

pub use catalog::Catalog;
pub use db::Database;
pub use planner::{Planner, PlannerConfig, WeeklyPlan};
pub use profile::{RawProfile, UserProfile};
