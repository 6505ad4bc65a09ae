//! Feature vectors for the user and for catalog items
//!
//! Every vector has the same nine dimensions. User and item vectors are built
//! by pure per-dimension rules, so the similarity between them is fully
//! determined by the profile, the item, the day's split and the used set.

use crate::catalog::{ExerciseType, Intensity, Meal, Split, Workout};
use crate::profile::{Diet, UserProfile};

use super::split::UsedWorkouts;

pub const FEATURE_DIMS: usize = 9;

/// Split score for a workout matching the day's split
pub const SPLIT_MATCH: f64 = 2.0;
/// Split score for an off-split workout
pub const SPLIT_MISMATCH: f64 = 0.05;
/// Multiplier applied to the split score of an already used workout
pub const USED_WORKOUT_PENALTY: f64 = 0.01;
/// Goal score for a high-intensity strength/bodyweight workout
pub const HIGH_INTENSITY_GOAL_BONUS: f64 = 1.3;
/// Goal score for a meal with at least `HIGH_PROTEIN_GRAMS` protein
pub const HIGH_PROTEIN_GOAL_BONUS: f64 = 1.3;
/// Diet score for a meal of the user's diet; any other diet scores zero
pub const DIET_MATCH: f64 = 1.0;

const HIGH_PROTEIN_GRAMS: u32 = 25;
const MIN_PROTEIN_GRAMS: u32 = 15;
const BUSY_WORK_HOURS: f64 = 8.0;
const UPPER_MUSCLE_GROUPS: &[&str] = &["chest", "back", "legs"];

/// Named vector positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Goal,
    Bmi,
    FreeTime,
    Age,
    Gender,
    Diet,
    Intensity,
    Split,
    Volume,
}

impl Dimension {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_DIMS]);

impl FeatureVector {
    pub fn get(&self, dim: Dimension) -> f64 {
        self.0[dim.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// User preference vector
pub fn user_vector(profile: &UserProfile) -> FeatureVector {
    let bmi = profile.bmi();
    let work_hours = profile.work_hours();
    let age = profile.age;
    let fitness = profile.is_fitness_goal();

    FeatureVector([
        if fitness { 1.0 } else { 0.5 },
        if bmi < 30.0 { (bmi / 30.0).min(1.0) } else { 0.5 },
        if work_hours < 12.0 { 1.0 - work_hours / 12.0 } else { 0.3 },
        if age <= 50.0 { 1.0 - age / 50.0 } else { 0.4 },
        if profile.is_male() { 1.0 } else { 0.9 },
        if profile.diet == Diet::Vegetarian { 1.0 } else { 0.8 },
        if bmi > 25.0 { 0.8 } else { 1.0 },
        if age < 35.0 { 1.0 } else { 0.7 },
        if fitness && bmi < 25.0 { 1.0 } else { 0.6 },
    ])
}

/// Item vector for a workout on a day targeting `target`
pub fn workout_vector(
    profile: &UserProfile,
    workout: &Workout,
    target: Split,
    used: &UsedWorkouts,
) -> FeatureVector {
    let bmi = profile.bmi();
    let high = workout.intensity == Intensity::High;

    let goal = match workout.exercise_type {
        ExerciseType::Strength | ExerciseType::Bodyweight if profile.is_fitness_goal() => {
            if high { HIGH_INTENSITY_GOAL_BONUS } else { 1.0 }
        }
        _ => 0.0,
    };

    let mut split = if workout.split == target { SPLIT_MATCH } else { SPLIT_MISMATCH };
    if used.contains(workout.id) {
        split *= USED_WORKOUT_PENALTY;
    }

    FeatureVector([
        goal,
        if bmi < 25.0 && workout.calories_burned > 150 { 1.0 } else { 0.7 },
        if workout.duration_minutes <= 30 && profile.work_hours() > BUSY_WORK_HOURS { 1.0 } else { 0.6 },
        if profile.age < 40.0 && !high { 1.0 } else { 0.5 },
        if profile.is_male() && UPPER_MUSCLE_GROUPS.contains(&workout.muscle_group.as_str()) { 1.0 } else { 0.9 },
        0.0,
        if workout.intensity == Intensity::Medium && bmi > 25.0 { 1.0 } else { 0.8 },
        split,
        if workout.sets >= 3 { 1.0 } else { 0.7 },
    ])
}

/// Item vector for a meal. Split, intensity and volume stay neutral.
pub fn meal_vector(profile: &UserProfile, meal: &Meal) -> FeatureVector {
    let bmi = profile.bmi();

    let goal = if profile.is_fitness_goal() && meal.protein >= MIN_PROTEIN_GRAMS {
        if meal.protein >= HIGH_PROTEIN_GRAMS { HIGH_PROTEIN_GOAL_BONUS } else { 1.0 }
    } else {
        0.0
    };

    FeatureVector([
        goal,
        if bmi < 25.0 || meal.calories < 600 { 1.0 } else { 0.6 },
        if meal.prep_time_minutes <= 20 && profile.work_hours() > BUSY_WORK_HOURS { 1.0 } else { 0.7 },
        if profile.age < 40.0 { 1.0 } else { 0.8 },
        if profile.is_male() && meal.protein > 20 { 1.0 } else { 0.9 },
        if meal.diet == profile.diet { DIET_MATCH } else { 0.0 },
        1.0,
        1.0,
        1.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, MealType};
    use crate::profile::RawProfile;

    fn scenario_profile() -> UserProfile {
        UserProfile::from_raw(&RawProfile {
            age: Some("25".into()),
            weight: Some("70".into()),
            height: Some("175".into()),
            gender: Some("male".into()),
            diet: Some("non-vegetarian".into()),
            goal: Some("fitness".into()),
            work_start: Some("9:00 AM".into()),
            work_end: Some("6:00 PM".into()),
            lunch_time: Some("1:00 PM".into()),
        })
    }

    fn bench_press() -> Workout {
        Catalog::sample().workouts()[0].clone()
    }

    fn meal(diet: Diet) -> Meal {
        Meal {
            id: 1,
            name: "Rice Bowl".into(),
            diet,
            calories: 500,
            protein: 20,
            carbs: 60,
            fat: 15,
            meal_type: MealType::Lunch,
            prep_time_minutes: 15,
            purpose: Some("Balanced for sustenance".into()),
            instructions: None,
        }
    }

    #[test]
    fn test_user_vector_defaults() {
        let v = user_vector(&UserProfile::default());
        let bmi = UserProfile::default().bmi();
        assert_eq!(v.get(Dimension::Goal), 1.0);
        assert!((v.get(Dimension::Bmi) - bmi / 30.0).abs() < 1e-12);
        // 13 work hours is past the free-time cutoff
        assert_eq!(v.get(Dimension::FreeTime), 0.3);
        assert!((v.get(Dimension::Age) - 0.4).abs() < 1e-12);
        assert_eq!(v.get(Dimension::Diet), 0.8);
        assert_eq!(v.get(Dimension::Intensity), 1.0);
        assert_eq!(v.get(Dimension::Split), 1.0);
        assert_eq!(v.get(Dimension::Volume), 1.0);
    }

    #[test]
    fn test_user_vector_older_heavier() {
        let profile = UserProfile {
            age: 60.0,
            weight_kg: 100.0,
            goal: "muscle gain".into(),
            ..UserProfile::default()
        };
        let v = user_vector(&profile);
        assert_eq!(v.get(Dimension::Goal), 0.5);
        assert_eq!(v.get(Dimension::Bmi), 0.5);
        assert_eq!(v.get(Dimension::Age), 0.4);
        assert_eq!(v.get(Dimension::Intensity), 0.8);
        assert_eq!(v.get(Dimension::Split), 0.7);
        assert_eq!(v.get(Dimension::Volume), 0.6);
    }

    #[test]
    fn test_workout_split_match_dominates() {
        let profile = scenario_profile();
        let used = UsedWorkouts::default();
        let on = workout_vector(&profile, &bench_press(), Split::Push, &used);
        let off = workout_vector(&profile, &bench_press(), Split::Pull, &used);
        assert_eq!(on.get(Dimension::Split), SPLIT_MATCH);
        assert_eq!(off.get(Dimension::Split), SPLIT_MISMATCH);
        assert_eq!(on.get(Dimension::Goal), HIGH_INTENSITY_GOAL_BONUS);
        assert_eq!(on.get(Dimension::Diet), 0.0);
    }

    #[test]
    fn test_used_workout_penalty() {
        let profile = scenario_profile();
        let mut used = UsedWorkouts::default();
        used.insert(bench_press().id);
        let v = workout_vector(&profile, &bench_press(), Split::Push, &used);
        assert!((v.get(Dimension::Split) - SPLIT_MATCH * USED_WORKOUT_PENALTY).abs() < 1e-12);
    }

    #[test]
    fn test_cardio_gets_no_goal_score() {
        let mut workout = bench_press();
        workout.exercise_type = ExerciseType::Cardio;
        let v = workout_vector(&scenario_profile(), &workout, Split::Push, &UsedWorkouts::default());
        assert_eq!(v.get(Dimension::Goal), 0.0);
    }

    #[test]
    fn test_meal_diet_match() {
        let profile = UserProfile {
            diet: Diet::Vegetarian,
            ..UserProfile::default()
        };
        let veg = meal_vector(&profile, &meal(Diet::Vegetarian));
        let non_veg = meal_vector(&profile, &meal(Diet::NonVegetarian));
        assert_eq!(veg.get(Dimension::Diet) - non_veg.get(Dimension::Diet), 1.0);
        for dim in [Dimension::Goal, Dimension::Bmi, Dimension::FreeTime, Dimension::Age, Dimension::Gender] {
            assert_eq!(veg.get(dim), non_veg.get(dim));
        }
    }

    #[test]
    fn test_meal_neutral_dimensions() {
        let v = meal_vector(&scenario_profile(), &meal(Diet::NonVegetarian));
        assert_eq!(v.get(Dimension::Intensity), 1.0);
        assert_eq!(v.get(Dimension::Split), 1.0);
        assert_eq!(v.get(Dimension::Volume), 1.0);
        assert_eq!(v.get(Dimension::Goal), 1.0);
        assert_eq!(v.get(Dimension::FreeTime), 1.0);
    }
}
