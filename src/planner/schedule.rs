//! Daily schedule composition - meal slots and the post-work workout block

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::catalog::{Intensity, Meal, MealType, Workout};
use crate::profile::{Diet, UserProfile};

use super::ranker::Ranked;

const TIME_FORMAT: &str = "%H:%M";

pub const CALORIE_TOLERANCE: u32 = 150;
pub const PROTEIN_TOLERANCE: u32 = 15;
pub const CARB_TOLERANCE: u32 = 30;

/// Workout block starts this long after work ends
pub const WORKOUT_START_OFFSET_MINUTES: i64 = 60;
pub const WORKOUT_BLOCK_MINUTES: i64 = 90;
pub const WARMUP: &str = "5 min dynamic stretches (leg swings, arm circles)";
const HIGH_INTENSITY_REST_SECS: u32 = 90;
const DEFAULT_REST_SECS: u32 = 60;

/// Meal types accepted by the diet-agnostic tier
const FALLBACK_MEAL_TYPES: &[MealType] = &[MealType::MainCourse, MealType::Breakfast, MealType::Snack];

/// A fixed meal slot and its nutrition target
#[derive(Debug, Clone, PartialEq)]
pub struct MealSlot {
    pub meal_type: MealType,
    pub time: NaiveTime,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub purpose: &'static str,
}

impl MealSlot {
    /// Breakfast at 07:00, lunch at the profile's lunch time, dinner at 20:00
    pub fn daily(profile: &UserProfile) -> [MealSlot; 3] {
        [
            MealSlot {
                meal_type: MealType::Breakfast,
                time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
                calories: 350,
                protein: 10,
                carbs: 50,
                fat: 10,
                purpose: "High-carb for energy",
            },
            MealSlot {
                meal_type: MealType::Lunch,
                time: profile.lunch_time,
                calories: 600,
                protein: 30,
                carbs: 70,
                fat: 20,
                purpose: "High-protein for recovery",
            },
            MealSlot {
                meal_type: MealType::Dinner,
                time: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default(),
                calories: 600,
                protein: 30,
                carbs: 70,
                fat: 20,
                purpose: "High-protein for recovery",
            },
        ]
    }

    fn within_tolerance(&self, meal: &Meal) -> bool {
        meal.calories.abs_diff(self.calories) <= CALORIE_TOLERANCE
            && meal.protein.abs_diff(self.protein) <= PROTEIN_TOLERANCE
            && meal.carbs.abs_diff(self.carbs) <= CARB_TOLERANCE
    }
}

/// One relaxation level of the meal search
pub type MealTier = fn(&Meal, &MealSlot, Diet) -> bool;

/// Slot type, diet, purpose tag and nutrition tolerance
pub fn tier_exact(meal: &Meal, slot: &MealSlot, diet: Diet) -> bool {
    tier_type_and_diet(meal, slot, diet) && slot.within_tolerance(meal)
}

/// Slot type, diet and purpose tag
pub fn tier_type_and_diet(meal: &Meal, slot: &MealSlot, diet: Diet) -> bool {
    meal.meal_type == slot.meal_type && meal.diet == diet && meal.purpose.is_some()
}

/// Any tagged main course, breakfast or snack, regardless of diet
pub fn tier_any_tagged(meal: &Meal, _slot: &MealSlot, _diet: Diet) -> bool {
    FALLBACK_MEAL_TYPES.contains(&meal.meal_type) && meal.purpose.is_some()
}

/// Tiers from strictest to loosest
pub const MEAL_TIERS: [MealTier; 3] = [tier_exact, tier_type_and_diet, tier_any_tagged];

/// First catalog meal passing the strictest non-empty tier, else the first
/// catalog meal. `None` only for an empty catalog.
pub fn select_meal<'a>(meals: &'a [Meal], slot: &MealSlot, diet: Diet) -> Option<&'a Meal> {
    MEAL_TIERS
        .iter()
        .find_map(|tier| meals.iter().find(|&m| tier(m, slot, diet)))
        .or_else(|| meals.first())
}

/// Schedule key: a meal time or a workout time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub start: NaiveTime,
    pub end: Option<NaiveTime>,
}

impl SlotKey {
    pub fn at(start: NaiveTime) -> Self {
        Self { start, end: None }
    }

    pub fn range(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end: Some(end) }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.format(TIME_FORMAT))?;
        if let Some(end) = self.end {
            write!(f, "-{}", end.format(TIME_FORMAT))?;
        }
        Ok(())
    }
}

impl FromStr for SlotKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((start, end)) => Ok(Self::range(
                NaiveTime::parse_from_str(start.trim(), TIME_FORMAT)?,
                NaiveTime::parse_from_str(end.trim(), TIME_FORMAT)?,
            )),
            None => Ok(Self::at(NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)?)),
        }
    }
}

impl Serialize for SlotKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub name: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub workout: Workout,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutBlock {
    pub name: String,
    pub warmup: String,
    pub details: Vec<WorkoutDetail>,
}

/// Slot record, tagged `{"type": "meal" | "workout", ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlotEntry {
    Meal(MealEntry),
    Workout(WorkoutBlock),
}

/// Time-ordered slots of one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySchedule {
    slots: BTreeMap<SlotKey, SlotEntry>,
}

impl DailySchedule {
    pub fn insert(&mut self, key: SlotKey, entry: SlotEntry) {
        self.slots.insert(key, entry);
    }

    pub fn get(&self, key: &SlotKey) -> Option<&SlotEntry> {
        self.slots.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &SlotEntry)> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn meal_count(&self) -> usize {
        self.iter().filter(|(_, e)| matches!(e, SlotEntry::Meal(_))).count()
    }

    pub fn workout(&self) -> Option<(&SlotKey, &WorkoutBlock)> {
        self.iter().find_map(|(key, entry)| match entry {
            SlotEntry::Workout(block) => Some((key, block)),
            SlotEntry::Meal(_) => None,
        })
    }
}

impl fmt::Display for DailySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, entry) in self.iter() {
            match entry {
                SlotEntry::Meal(meal) => writeln!(
                    f,
                    "{} | {} ({} kcal, P{} C{} F{}) - {}",
                    key, meal.name, meal.calories, meal.protein, meal.carbs, meal.fat, meal.purpose
                )?,
                SlotEntry::Workout(block) => {
                    writeln!(f, "{} | {} - warm-up: {}", key, block.name, block.warmup)?;
                    for detail in &block.details {
                        writeln!(
                            f,
                            "    • {} {}x{} - {}",
                            detail.workout.name, detail.workout.sets, detail.workout.reps, detail.instructions
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Set/rest instruction for a workout
pub fn instructions_for(workout: &Workout) -> String {
    let rest = if workout.intensity == Intensity::High {
        HIGH_INTENSITY_REST_SECS
    } else {
        DEFAULT_REST_SECS
    };
    format!("Use 70-80% 1RM, rest {}s.", rest)
}

/// Lay out one day: meal slots from the full catalog, then the workout block
pub fn compose_day(profile: &UserProfile, workouts: &[Ranked<'_, Workout>], meals: &[Meal]) -> DailySchedule {
    let mut schedule = DailySchedule::default();

    for slot in MealSlot::daily(profile) {
        let Some(meal) = select_meal(meals, &slot, profile.diet) else {
            warn!("Meal catalog is empty, leaving {} unfilled", slot.time.format(TIME_FORMAT));
            continue;
        };
        schedule.insert(
            SlotKey::at(slot.time),
            SlotEntry::Meal(MealEntry {
                name: meal.name.clone(),
                calories: meal.calories,
                protein: meal.protein,
                carbs: meal.carbs,
                fat: meal.fat,
                purpose: meal.purpose.clone().unwrap_or_else(|| slot.purpose.to_string()),
            }),
        );
    }

    if let Some(first) = workouts.first() {
        let (start, _) = profile
            .work_end
            .overflowing_add_signed(Duration::minutes(WORKOUT_START_OFFSET_MINUTES));
        let (end, _) = start.overflowing_add_signed(Duration::minutes(WORKOUT_BLOCK_MINUTES));

        let details = workouts
            .iter()
            .map(|r| WorkoutDetail {
                workout: r.item.clone(),
                instructions: instructions_for(r.item),
            })
            .collect();

        schedule.insert(
            SlotKey::range(start, end),
            SlotEntry::Workout(WorkoutBlock {
                name: format!("{} Day", first.item.split.label()),
                warmup: WARMUP.to_string(),
                details,
            }),
        );
    }

    schedule
}
