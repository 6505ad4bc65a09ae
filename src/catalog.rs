//! Catalog of workouts and meals - loaded once, read-only afterwards

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::profile::Diet;

/// Workout-day category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Push,
    Pull,
    Legs,
    Rest,
}

impl Split {
    pub fn label(&self) -> &'static str {
        match self {
            Split::Push => "Push",
            Split::Pull => "Pull",
            Split::Legs => "Legs",
            Split::Rest => "Rest",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Strength,
    Bodyweight,
    Cardio,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[serde(rename = "main course")]
    MainCourse,
}

fn default_workout_minutes() -> u32 {
    20
}

fn default_prep_minutes() -> u32 {
    30
}

/// Rest is a day category, never a workout's split
fn training_split<'de, D>(deserializer: D) -> Result<Split, D::Error>
where
    D: Deserializer<'de>,
{
    match Split::deserialize(deserializer)? {
        Split::Rest => Err(serde::de::Error::custom("workout split must be push, pull or legs")),
        split => Ok(split),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub muscle_group: String,
    #[serde(deserialize_with = "training_split")]
    pub split: Split,
    pub equipment: String,
    pub calories_burned: u32,
    #[serde(default = "default_workout_minutes")]
    pub duration_minutes: u32,
    pub sets: u32,
    pub reps: String,
    pub intensity: Intensity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub diet: Diet,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub meal_type: MealType,
    #[serde(default = "default_prep_minutes")]
    pub prep_time_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Ordered, read-only item collections
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    workouts: Vec<Workout>,
    meals: Vec<Meal>,
}

impl Catalog {
    pub fn from_parts(workouts: Vec<Workout>, meals: Vec<Meal>) -> Self {
        warn_duplicate_ids("workout", workouts.iter().map(|w| w.id));
        warn_duplicate_ids("meal", meals.iter().map(|m| m.id));
        Self { workouts, meals }
    }

    /// Load both collections from JSON array files
    pub fn load(workouts_path: &Path, meals_path: &Path) -> Result<Self> {
        let workouts: Vec<Workout> = read_json(workouts_path)?;
        let meals: Vec<Meal> = read_json(meals_path)?;
        info!("Loaded {} workouts and {} meals", workouts.len(), meals.len());
        Ok(Self::from_parts(workouts, meals))
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    /// Built-in catalog: classic push/pull/legs lifts and everyday meals
    pub fn sample() -> Self {
        let workouts = SAMPLE_WORKOUTS
            .iter()
            .enumerate()
            .map(|(i, w)| Workout {
                id: i as u32 + 1,
                name: w.0.to_string(),
                exercise_type: w.1,
                muscle_group: w.2.to_string(),
                split: w.3,
                equipment: w.4.to_string(),
                calories_burned: w.5,
                duration_minutes: w.6,
                sets: 3,
                reps: w.7.to_string(),
                intensity: w.8,
            })
            .collect();

        let meals = SAMPLE_MEALS
            .iter()
            .enumerate()
            .map(|(i, m)| Meal {
                id: i as u32 + 1,
                name: m.0.to_string(),
                diet: m.1,
                calories: m.2,
                protein: m.3,
                carbs: m.4,
                fat: m.5,
                meal_type: m.6,
                prep_time_minutes: m.7,
                purpose: Some(m.8.to_string()),
                instructions: None,
            })
            .collect();

        Self { workouts, meals }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing catalog {}", path.display()))
}

fn warn_duplicate_ids(kind: &str, ids: impl Iterator<Item = u32>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            warn!("Duplicate {} id {} in catalog", kind, id);
        }
    }
}

type SampleWorkout = (&'static str, ExerciseType, &'static str, Split, &'static str, u32, u32, &'static str, Intensity);

const SAMPLE_WORKOUTS: &[SampleWorkout] = &[
    ("Bench Press", ExerciseType::Strength, "chest", Split::Push, "barbell", 200, 20, "8-12", Intensity::High),
    ("Pull-Ups", ExerciseType::Bodyweight, "back", Split::Pull, "pull-up bar", 180, 15, "6-10", Intensity::High),
    ("Squats", ExerciseType::Strength, "legs", Split::Legs, "barbell", 250, 20, "8-12", Intensity::High),
    ("Incline Press", ExerciseType::Strength, "chest", Split::Push, "dumbbell", 180, 20, "10-12", Intensity::High),
    ("Deadlift", ExerciseType::Strength, "back", Split::Pull, "barbell", 300, 20, "6-10", Intensity::High),
    ("Leg Press", ExerciseType::Strength, "legs", Split::Legs, "machine", 230, 20, "10-12", Intensity::High),
    ("Lateral Raises", ExerciseType::Strength, "shoulders", Split::Push, "dumbbell", 130, 15, "12-15", Intensity::Medium),
    ("Bicep Curls", ExerciseType::Strength, "biceps", Split::Pull, "dumbbell", 130, 15, "12-15", Intensity::Medium),
    ("Calf Raises", ExerciseType::Strength, "calves", Split::Legs, "none", 120, 15, "15-20", Intensity::Medium),
    ("Tricep Dips", ExerciseType::Bodyweight, "triceps", Split::Push, "dip bar", 150, 15, "10-15", Intensity::Medium),
];

type SampleMeal = (&'static str, Diet, u32, u32, u32, u32, MealType, u32, &'static str);

const SAMPLE_MEALS: &[SampleMeal] = &[
    ("Oatmeal with Protein Powder", Diet::Vegetarian, 400, 20, 60, 10, MealType::Breakfast, 10, "High-carb for energy"),
    ("Chicken Wrap", Diet::NonVegetarian, 500, 30, 50, 15, MealType::Lunch, 15, "High-protein for recovery"),
    ("Grilled Chicken Salad", Diet::NonVegetarian, 400, 35, 20, 15, MealType::Dinner, 20, "High-protein for recovery"),
    ("Vegetable Pulao", Diet::Vegetarian, 450, 10, 70, 12, MealType::Lunch, 30, "Balanced for sustenance"),
    ("Paneer Tikka", Diet::Vegetarian, 400, 20, 30, 25, MealType::Dinner, 30, "Balanced for sustenance"),
    ("Boiled Eggs with Toast", Diet::NonVegetarian, 350, 18, 30, 15, MealType::Breakfast, 15, "Moderate for energy"),
    ("Salmon with Quinoa", Diet::NonVegetarian, 450, 30, 40, 18, MealType::Dinner, 25, "High-protein for recovery"),
    ("Chickpea Salad", Diet::Vegetarian, 400, 15, 50, 15, MealType::Lunch, 15, "Balanced for sustenance"),
    ("Greek Yogurt with Fruit", Diet::Vegetarian, 300, 15, 40, 5, MealType::Breakfast, 5, "High-carb for energy"),
    ("Turkey Sandwich", Diet::NonVegetarian, 450, 25, 50, 10, MealType::Lunch, 10, "High-protein for recovery"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_catalog() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.workouts().len(), 10);
        assert_eq!(catalog.meals().len(), 10);
        assert!(catalog.meals().iter().all(|m| m.purpose.is_some()));
        for split in [Split::Push, Split::Pull, Split::Legs] {
            assert!(catalog.workouts().iter().any(|w| w.split == split));
        }
    }

    #[test]
    fn test_parse_workout_json() {
        let json = r#"[{"id": 7, "name": "Plank", "type": "bodyweight", "muscle_group": "core",
            "split": "push", "equipment": "none", "calories_burned": 90, "sets": 3,
            "reps": "60s", "intensity": "low", "youtube_link": ""}]"#;
        let workouts: Vec<Workout> = serde_json::from_str(json).unwrap();
        assert_eq!(workouts[0].exercise_type, ExerciseType::Bodyweight);
        assert_eq!(workouts[0].intensity, Intensity::Low);
        assert_eq!(workouts[0].duration_minutes, 20);
    }

    #[test]
    fn test_parse_meal_json() {
        let json = r#"[{"id": 3, "name": "Dal", "type": "vegetarian", "calories": 500,
            "protein": 20, "carbs": 60, "fat": 15, "meal_type": "main course"}]"#;
        let meals: Vec<Meal> = serde_json::from_str(json).unwrap();
        assert_eq!(meals[0].diet, Diet::Vegetarian);
        assert_eq!(meals[0].meal_type, MealType::MainCourse);
        assert_eq!(meals[0].prep_time_minutes, 30);
        assert!(meals[0].purpose.is_none());
    }

    #[test]
    fn test_rest_split_rejected() {
        let json = r#"[{"id": 9, "name": "Stretch", "type": "bodyweight", "muscle_group": "full body",
            "split": "rest", "equipment": "none", "calories_burned": 40, "sets": 1, "reps": "5 min",
            "intensity": "low"}]"#;
        let err = serde_json::from_str::<Vec<Workout>>(json).unwrap_err();
        assert!(err.to_string().contains("push, pull or legs"), "Error: {}", err);
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let sample = Catalog::sample();
        let mut workouts = sample.workouts().to_vec();
        workouts.push(workouts[0].clone());
        let mut meals = sample.meals().to_vec();
        meals[1].id = meals[0].id;

        let catalog = Catalog::from_parts(workouts, meals);
        assert_eq!(catalog.workouts().len(), sample.workouts().len() + 1);
        assert_eq!(catalog.meals().len(), sample.meals().len());
        assert_eq!(catalog.meals()[0].id, catalog.meals()[1].id);
        assert_eq!(catalog.meals()[1].name, sample.meals()[1].name);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = Catalog::load(Path::new("/nonexistent/workouts.json"), Path::new("/nonexistent/meals.json"))
            .unwrap_err();
        assert!(err.to_string().contains("workouts.json"), "Error: {}", err);
    }

    #[test]
    fn test_load_from_files() {
        let dir = std::env::temp_dir().join(format!("fitplan-catalog-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let sample = Catalog::sample();
        let workouts_path = dir.join("workouts.json");
        let meals_path = dir.join("meals.json");
        std::fs::write(&workouts_path, serde_json::to_string(sample.workouts()).unwrap()).unwrap();
        std::fs::write(&meals_path, serde_json::to_string(sample.meals()).unwrap()).unwrap();

        let loaded = Catalog::load(&workouts_path, &meals_path).unwrap();
        assert_eq!(loaded.workouts(), sample.workouts());
        assert_eq!(loaded.meals(), sample.meals());

        std::fs::remove_dir_all(&dir).ok();
    }
}
