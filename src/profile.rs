//! Profile normalizer - raw submission fields into a typed, defaulted profile

use std::ops::RangeInclusive;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_AGE: f64 = 30.0;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_GOAL: &str = "fitness";

/// Accepted ranges; anything outside takes the default
const AGE_RANGE: RangeInclusive<f64> = 1.0..=120.0;
const WEIGHT_RANGE_KG: RangeInclusive<f64> = 1.0..=500.0;
const HEIGHT_RANGE_CM: RangeInclusive<f64> = 30.0..=300.0;

/// Time formats accepted for work hours and lunch (tried in order)
const TIME_FORMATS: &[&str] = &["%I:%M %p", "%I:%M%p", "%H:%M", "%H:%M:%S"];

const SECONDS_PER_DAY: i64 = 24 * 3600;

pub fn default_work_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

pub fn default_work_end() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default()
}

pub fn default_lunch_time() -> NaiveTime {
    NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_default()
}

/// Profile payload as submitted. Every field is optional text;
/// JSON numbers are kept as their text form, other JSON types are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    #[serde(default, deserialize_with = "lenient_text")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub weight: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub height: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub diet: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub goal: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub work_start: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub work_end: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lunch_time: Option<String>,
}

impl RawProfile {
    /// Parse a submission body. Only a body that is not a JSON object fails.
    pub fn from_json(body: &str) -> anyhow::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        if !value.is_object() {
            anyhow::bail!("profile must be a JSON object");
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Other,
}

/// Dietary preference, shared by profiles and meals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Diet {
    Vegetarian,
    NonVegetarian,
}

impl Diet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Diet::Vegetarian => "vegetarian",
            Diet::NonVegetarian => "non-vegetarian",
        }
    }
}

/// Normalized user profile, rebuilt per request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub age: f64,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub gender: Gender,
    pub diet: Diet,
    /// Lowercased goal ("fitness", "weight loss", "muscle gain", ...)
    pub goal: String,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub lunch_time: NaiveTime,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::from_raw(&RawProfile::default())
    }
}

impl UserProfile {
    /// Build a profile from raw fields. Never fails: anything missing or
    /// unparseable takes its documented default.
    pub fn from_raw(raw: &RawProfile) -> Self {
        Self {
            age: parse_number(raw.age.as_deref(), AGE_RANGE).unwrap_or(DEFAULT_AGE),
            weight_kg: parse_number(raw.weight.as_deref(), WEIGHT_RANGE_KG).unwrap_or(DEFAULT_WEIGHT_KG),
            height_cm: parse_number(raw.height.as_deref(), HEIGHT_RANGE_CM).unwrap_or(DEFAULT_HEIGHT_CM),
            gender: match normalized(raw.gender.as_deref()).as_deref() {
                None | Some("male") => Gender::Male,
                Some(_) => Gender::Other,
            },
            diet: match normalized(raw.diet.as_deref()).as_deref() {
                Some("vegetarian") => Diet::Vegetarian,
                _ => Diet::NonVegetarian,
            },
            goal: normalized(raw.goal.as_deref()).unwrap_or_else(|| DEFAULT_GOAL.to_string()),
            work_start: parse_time(raw.work_start.as_deref()).unwrap_or_else(default_work_start),
            work_end: parse_time(raw.work_end.as_deref()).unwrap_or_else(default_work_end),
            lunch_time: parse_time(raw.lunch_time.as_deref()).unwrap_or_else(default_lunch_time),
        }
    }

    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }

    /// Hours between work start and end; an end before the start wraps past midnight
    pub fn work_hours(&self) -> f64 {
        let start = self.work_start.num_seconds_from_midnight() as i64;
        let end = self.work_end.num_seconds_from_midnight() as i64;
        (end - start).rem_euclid(SECONDS_PER_DAY) as f64 / 3600.0
    }

    pub fn is_fitness_goal(&self) -> bool {
        self.goal == DEFAULT_GOAL
    }

    pub fn is_male(&self) -> bool {
        self.gender == Gender::Male
    }
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Number inside `range` or nothing
fn parse_number(value: Option<&str>, range: RangeInclusive<f64>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| range.contains(n))
}

/// Parse "9:00 AM", "09:00PM", "21:30" or "21:30:00"
pub fn parse_time(value: Option<&str>) -> Option<NaiveTime> {
    let value = value?.trim().to_uppercase();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&value, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_default_profile() {
        let profile = UserProfile::default();
        assert_eq!(profile.age, 30.0);
        assert_eq!(profile.weight_kg, 70.0);
        assert_eq!(profile.height_cm, 170.0);
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.diet, Diet::NonVegetarian);
        assert_eq!(profile.goal, "fitness");
        assert_eq!(profile.work_start, time(9, 0));
        assert_eq!(profile.work_end, time(22, 0));
        assert_eq!(profile.lunch_time, time(13, 0));
    }

    #[test]
    fn test_default_bmi() {
        let bmi = UserProfile::default().bmi();
        assert!((bmi - 24.22).abs() < 0.01, "BMI: {}", bmi);
    }

    #[test]
    fn test_bmi_positive_for_malformed_input() {
        let raw = RawProfile {
            weight: Some("-5".to_string()),
            height: Some("0".to_string()),
            age: Some("NaN".to_string()),
            ..Default::default()
        };
        let profile = UserProfile::from_raw(&raw);
        let bmi = profile.bmi();
        assert!(bmi > 0.0 && bmi.is_finite());
        assert_eq!(profile.age, DEFAULT_AGE);
    }

    #[test]
    fn test_bmi_extreme_inputs() {
        let cases = [("70", "1e-200"), ("1e308", "1"), ("5e-324", "1e300"), ("inf", "175"), ("70", "-0")];
        for (weight, height) in cases {
            let raw = RawProfile {
                weight: Some(weight.to_string()),
                height: Some(height.to_string()),
                ..Default::default()
            };
            let bmi = UserProfile::from_raw(&raw).bmi();
            assert!(bmi > 0.0 && bmi.is_finite(), "BMI {} for weight={} height={}", bmi, weight, height);
        }
    }

    #[test]
    fn test_out_of_range_numbers_use_defaults() {
        let raw = RawProfile {
            age: Some("500".to_string()),
            weight: Some("0.5".to_string()),
            height: Some("1000".to_string()),
            ..Default::default()
        };
        let profile = UserProfile::from_raw(&raw);
        assert_eq!(profile.age, DEFAULT_AGE);
        assert_eq!(profile.weight_kg, DEFAULT_WEIGHT_KG);
        assert_eq!(profile.height_cm, DEFAULT_HEIGHT_CM);

        let raw = RawProfile {
            weight: Some("500".to_string()),
            height: Some("30".to_string()),
            ..Default::default()
        };
        let profile = UserProfile::from_raw(&raw);
        assert_eq!(profile.weight_kg, 500.0);
        assert_eq!(profile.height_cm, 30.0);
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time(Some("9:00 AM")), Some(time(9, 0)));
        assert_eq!(parse_time(Some("6:00 pm")), Some(time(18, 0)));
        assert_eq!(parse_time(Some("06:30PM")), Some(time(18, 30)));
        assert_eq!(parse_time(Some("21:15")), Some(time(21, 15)));
        assert_eq!(parse_time(Some("lunchtime")), None);
        assert_eq!(parse_time(None), None);
    }

    #[test]
    fn test_work_hours() {
        let raw = RawProfile {
            work_start: Some("9:00 AM".to_string()),
            work_end: Some("6:00 PM".to_string()),
            ..Default::default()
        };
        assert_eq!(UserProfile::from_raw(&raw).work_hours(), 9.0);
        assert_eq!(UserProfile::default().work_hours(), 13.0);
    }

    #[test]
    fn test_work_hours_overnight_shift() {
        let raw = RawProfile {
            work_start: Some("10:00 PM".to_string()),
            work_end: Some("6:00 AM".to_string()),
            ..Default::default()
        };
        assert_eq!(UserProfile::from_raw(&raw).work_hours(), 8.0);
    }

    #[test]
    fn test_from_json_numbers_and_strings() {
        let raw = RawProfile::from_json(
            r#"{"age": 25, "weight": "70", "height": 175.5, "gender": "Female", "diet": "Vegetarian", "goal": " Weight Loss "}"#,
        )
        .unwrap();
        let profile = UserProfile::from_raw(&raw);
        assert_eq!(profile.age, 25.0);
        assert_eq!(profile.weight_kg, 70.0);
        assert_eq!(profile.height_cm, 175.5);
        assert_eq!(profile.gender, Gender::Other);
        assert_eq!(profile.diet, Diet::Vegetarian);
        assert_eq!(profile.goal, "weight loss");
        assert!(!profile.is_fitness_goal());
    }

    #[test]
    fn test_from_json_wrong_types_fall_back() {
        let raw = RawProfile::from_json(r#"{"age": true, "weight": [1, 2], "work_end": {"h": 5}, "goal": null}"#)
            .unwrap();
        assert_eq!(raw.age, None);
        let profile = UserProfile::from_raw(&raw);
        assert_eq!(profile, UserProfile::default());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(RawProfile::from_json("[1, 2, 3]").is_err());
        assert!(RawProfile::from_json("not json").is_err());
    }

    #[test]
    fn test_blank_goal_uses_default() {
        let raw = RawProfile {
            goal: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(UserProfile::from_raw(&raw).is_fitness_goal());
    }
}
