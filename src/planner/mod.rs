//! Planner - workout and meal recommendations assembled into a weekly plan
//!
//! Pipeline per day:
//! - split for the weekday (rest days get no workouts)
//! - workouts ranked against the user vector, used ids penalized
//! - meals ranked against the user vector
//! - schedule composed from the picks and the full meal catalog

pub mod features;
pub mod ranker;
pub mod schedule;
pub mod split;

pub use ranker::Ranked;
pub use schedule::{DailySchedule, SlotEntry, SlotKey};
pub use split::UsedWorkouts;

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, Meal, Split, Workout};
use crate::profile::UserProfile;

use features::{meal_vector, user_vector, workout_vector};
use split::split_for_weekday;

/// Days in one plan
pub const PLAN_HORIZON_DAYS: u64 = 7;
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    /// Items kept per day and item type
    pub top_k: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

/// One day of a weekly plan
#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    pub offset: u32,
    pub date: NaiveDate,
    /// 0 = Monday
    pub weekday: u32,
    pub split: Split,
    pub schedule: DailySchedule,
    /// Top-ranked meals for the day
    pub suggested_meals: Vec<Meal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyPlan {
    pub reference_date: NaiveDate,
    pub days: Vec<DayPlan>,
}

impl WeeklyPlan {
    pub fn day(&self, offset: usize) -> Option<&DayPlan> {
        self.days.get(offset)
    }

    /// The day returned to the submitter
    pub fn first_day(&self) -> Option<&DayPlan> {
        self.days.first()
    }
}

/// Recommendation engine over a shared, read-only catalog.
/// Stateless between calls; each weekly run owns its used set.
#[derive(Debug, Clone)]
pub struct Planner {
    catalog: Arc<Catalog>,
    config: PlannerConfig,
}

impl Planner {
    pub fn new(catalog: Arc<Catalog>, config: PlannerConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Top workouts for a split; empty on rest days
    pub fn recommend_workouts(
        &self,
        profile: &UserProfile,
        split: Split,
        used: &UsedWorkouts,
    ) -> Vec<Ranked<'_, Workout>> {
        if split == Split::Rest {
            return Vec::new();
        }

        let user = user_vector(profile);
        let candidates = self
            .catalog
            .workouts()
            .iter()
            .map(|w| (w, workout_vector(profile, w, split, used)));
        ranker::top_k(&user, candidates, self.config.top_k)
    }

    pub fn recommend_meals(&self, profile: &UserProfile) -> Vec<Ranked<'_, Meal>> {
        let user = user_vector(profile);
        let candidates = self.catalog.meals().iter().map(|m| (m, meal_vector(profile, m)));
        ranker::top_k(&user, candidates, self.config.top_k)
    }

    /// Plan a single day and record its workouts in `used`
    pub fn plan_day(&self, profile: &UserProfile, date: NaiveDate, offset: u32, used: &mut UsedWorkouts) -> DayPlan {
        let weekday = date.weekday().num_days_from_monday();
        let split = split_for_weekday(weekday);

        let workouts = self.recommend_workouts(profile, split, used);
        used.record(&workouts);

        let meals = self.recommend_meals(profile);
        let schedule = schedule::compose_day(profile, &workouts, self.catalog.meals());

        debug!(
            "Day {} ({}): {:?} split, {} workouts, {} slots",
            offset,
            date,
            split,
            workouts.len(),
            schedule.len()
        );

        DayPlan {
            offset,
            date,
            weekday,
            split,
            schedule,
            suggested_meals: meals.into_iter().map(|r| r.item.clone()).collect(),
        }
    }

    /// Seven days starting at `reference_date`
    pub fn plan_week(&self, profile: &UserProfile, reference_date: NaiveDate) -> WeeklyPlan {
        let mut used = UsedWorkouts::default();
        let days = (0..PLAN_HORIZON_DAYS)
            .map(|offset| {
                let date = reference_date
                    .checked_add_days(Days::new(offset))
                    .unwrap_or(reference_date);
                self.plan_day(profile, date, offset as u32, &mut used)
            })
            .collect();

        debug!("Planned week from {} with {} distinct workouts", reference_date, used.len());

        WeeklyPlan { reference_date, days }
    }
}
