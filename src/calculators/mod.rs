//! Health calculators. Pure functions over validated numbers; the command
//! layer in [`commands`] turns raw form input into calls here.

pub mod commands;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FitnessError, FitnessResult};

/// Mifflin-St Jeor needs age and sex; the calorie tool has no fields for them
/// and assumes a 30 year old man.
pub const ASSUMED_AGE_YEARS: f64 = 30.0;
const ASSUMED_SEX_OFFSET: f64 = 5.0;

pub const MIN_REPS: u32 = 1;
pub const MAX_REPS: u32 = 15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BmiCategory {
    Underweight,
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::NormalWeight
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal Weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BmiReading {
    pub value: f64,
    pub category: BmiCategory,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = FitnessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(FitnessError::validation(format!("unknown gender '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BodyFatCategory {
    VeryLow,
    Low,
    Normal,
    High,
}

impl BodyFatCategory {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 10.0 {
            BodyFatCategory::VeryLow
        } else if percent < 20.0 {
            BodyFatCategory::Low
        } else if percent < 25.0 {
            BodyFatCategory::Normal
        } else {
            BodyFatCategory::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BodyFatCategory::VeryLow => "Very Low",
            BodyFatCategory::Low => "Low",
            BodyFatCategory::Normal => "Normal",
            BodyFatCategory::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BodyFatReading {
    pub percent: f64,
    pub category: BodyFatCategory,
}

fn require_positive(value: f64, field: &str) -> FitnessResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FitnessError::validation(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}

pub fn bmi(height_cm: f64, weight_kg: f64) -> FitnessResult<BmiReading> {
    let height_m = require_positive(height_cm, "height")? / 100.0;
    let weight_kg = require_positive(weight_kg, "weight")?;
    let value = weight_kg / (height_m * height_m);
    Ok(BmiReading {
        value,
        category: BmiCategory::from_bmi(value),
    })
}

/// Waist-based estimate, clamped at zero.
pub fn body_fat(gender: Gender, age_years: f64, waist_cm: f64) -> FitnessResult<BodyFatReading> {
    let age = require_positive(age_years, "age")?;
    let waist = require_positive(waist_cm, "waist")?;
    let raw = match gender {
        Gender::Male => waist * 1.082 + age * 0.13 - 98.42,
        Gender::Female => waist * 1.48 + age * 0.16 - 87.02,
    };
    let percent = raw.max(0.0);
    Ok(BodyFatReading {
        percent,
        category: BodyFatCategory::from_percent(percent),
    })
}

/// Daily calorie target: BMR (see [`ASSUMED_AGE_YEARS`]) times the activity
/// multiplier plus the goal offset, rounded.
pub fn daily_calories(
    height_cm: f64,
    weight_kg: f64,
    activity_multiplier: f64,
    goal_offset: i64,
) -> FitnessResult<i64> {
    let height = require_positive(height_cm, "height")?;
    let weight = require_positive(weight_kg, "weight")?;
    let activity = require_positive(activity_multiplier, "activity multiplier")?;

    let bmr = 10.0 * weight + 6.25 * height - 5.0 * ASSUMED_AGE_YEARS + ASSUMED_SEX_OFFSET;
    let tdee = bmr * activity;
    Ok((tdee + goal_offset as f64).round() as i64)
}

/// Brzycki estimate; one rep is the weight itself.
pub fn one_rep_max(weight: f64, reps: u32) -> FitnessResult<f64> {
    let weight = require_positive(weight, "weight")?;
    if !(MIN_REPS..=MAX_REPS).contains(&reps) {
        return Err(FitnessError::validation(format!(
            "reps must be between {MIN_REPS} and {MAX_REPS}, got {reps}"
        )));
    }
    if reps == 1 {
        return Ok(weight);
    }
    Ok(weight * (36.0 / (37.0 - f64::from(reps))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn bmi_boundary_of_25_is_overweight() {
        let reading = bmi(180.0, 81.0).unwrap();
        assert!(close(reading.value, 25.0));
        assert_eq!(reading.category, BmiCategory::Overweight);
        assert_eq!(reading.category.label(), "Overweight");
    }

    #[test]
    fn bmi_categories() {
        assert_eq!(BmiCategory::from_bmi(18.49), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::NormalWeight);
        assert_eq!(BmiCategory::from_bmi(29.99), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn bmi_rejects_non_positive_or_nan() {
        assert!(bmi(0.0, 80.0).is_err());
        assert!(bmi(180.0, -1.0).is_err());
        assert!(bmi(f64::NAN, 80.0).unwrap_err().is_validation());
    }

    #[test]
    fn body_fat_formulas_and_clamp() {
        let male = body_fat(Gender::Male, 30.0, 100.0).unwrap();
        assert!(close(male.percent, 100.0 * 1.082 + 30.0 * 0.13 - 98.42));
        assert_eq!(male.category, BodyFatCategory::Low);

        let female = body_fat(Gender::Female, 40.0, 80.0).unwrap();
        assert!(close(female.percent, 80.0 * 1.48 + 40.0 * 0.16 - 87.02));
        assert_eq!(female.category, BodyFatCategory::High);

        let lean = body_fat(Gender::Male, 20.0, 60.0).unwrap();
        assert_eq!(lean.percent, 0.0);
        assert_eq!(lean.category, BodyFatCategory::VeryLow);
    }

    #[test]
    fn calories_use_fixed_age_and_sex() {
        // bmr = 800 + 1125 - 150 + 5 = 1780
        assert_eq!(daily_calories(180.0, 80.0, 1.2, 0).unwrap(), 2136);
        assert_eq!(daily_calories(180.0, 80.0, 1.55, -500).unwrap(), 2259);
        assert!(daily_calories(180.0, 80.0, 0.0, 0).is_err());
    }

    #[test]
    fn one_rep_max_brzycki() {
        assert_eq!(one_rep_max(100.0, 1).unwrap(), 100.0);
        let estimate = one_rep_max(100.0, 10).unwrap();
        assert!((estimate - 133.333).abs() < 0.001);
        assert!(one_rep_max(100.0, 15).is_ok());
    }

    #[test]
    fn one_rep_max_rejects_reps_outside_range() {
        assert!(one_rep_max(100.0, 0).unwrap_err().is_validation());
        assert!(one_rep_max(100.0, 16).is_err());
        assert!(one_rep_max(0.0, 5).is_err());
    }

    #[test]
    fn gender_parses_case_insensitively() {
        assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" female ".parse::<Gender>().unwrap(), Gender::Female);
        assert!("other".parse::<Gender>().is_err());
    }
}
