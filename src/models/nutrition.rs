use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FitnessError, FitnessResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoodEntry {
    pub food: String,
    pub calories: u32,
}

impl FoodEntry {
    pub fn new(food: &str, calories: i64) -> FitnessResult<Self> {
        let food = food.trim();
        if food.is_empty() {
            return Err(FitnessError::validation("food name must not be empty"));
        }
        if calories <= 0 {
            return Err(FitnessError::validation(format!(
                "food calories must be positive, got {calories}"
            )));
        }
        let calories = u32::try_from(calories)
            .map_err(|_| FitnessError::validation(format!("food calories {calories} is too large")))?;
        Ok(Self {
            food: food.to_string(),
            calories,
        })
    }
}

/// Day key (`YYYY-MM-DD`) to that day's entries, in insertion order.
pub type NutritionLog = BTreeMap<String, Vec<FoodEntry>>;

pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_is_trimmed_and_validated() {
        let entry = FoodEntry::new("  oats ", 150).unwrap();
        assert_eq!(entry.food, "oats");
        assert!(FoodEntry::new("   ", 150).is_err());
        assert!(FoodEntry::new("oats", 0).is_err());
        assert!(FoodEntry::new("oats", -20).is_err());
    }

    #[test]
    fn day_key_is_iso_date() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(day_key(day), "2024-01-09");
    }
}
