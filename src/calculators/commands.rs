use crate::{
    error::{FitnessError, FitnessResult},
    input::{parse_integer, parse_positive, reject},
    AppContext,
};

use super::{BmiReading, BodyFatReading, Gender};

const BMI_INPUT_MESSAGE: &str = "Please enter valid height and weight values";
const BODY_FAT_INPUT_MESSAGE: &str = "Please enter valid age and waist measurements";
const CALORIE_INPUT_MESSAGE: &str = "Please calculate BMI first or enter height and weight";
const ONE_REP_MAX_INPUT_MESSAGE: &str = "Please enter valid weight and reps (1-15)";

fn required(raw: &str, field: &str) -> Result<f64, FitnessError> {
    parse_positive(raw)
        .ok_or_else(|| FitnessError::validation(format!("{field} '{raw}' is not a positive number")))
}

pub fn calculate_bmi(ctx: &AppContext, height: &str, weight: &str) -> Result<BmiReading, String> {
    let result = (|| -> FitnessResult<BmiReading> {
        let height = required(height, "height")?;
        let weight = required(weight, "weight")?;
        super::bmi(height, weight)
    })();
    result.map_err(|err| reject(&ctx.events, &err, BMI_INPUT_MESSAGE))
}

pub fn calculate_body_fat(
    ctx: &AppContext,
    gender: &str,
    age: &str,
    waist: &str,
) -> Result<BodyFatReading, String> {
    let result = (|| -> FitnessResult<BodyFatReading> {
        let gender: Gender = gender.parse()?;
        let age = required(age, "age")?;
        let waist = required(waist, "waist")?;
        super::body_fat(gender, age, waist)
    })();
    result.map_err(|err| reject(&ctx.events, &err, BODY_FAT_INPUT_MESSAGE))
}

/// `activity` is the multiplier from the activity select, `goal` the
/// signed kcal offset from the goal select.
pub fn calculate_calories(
    ctx: &AppContext,
    height: &str,
    weight: &str,
    activity: &str,
    goal: &str,
) -> Result<i64, String> {
    let result = (|| -> FitnessResult<i64> {
        let height = required(height, "height")?;
        let weight = required(weight, "weight")?;
        let activity = required(activity, "activity multiplier")?;
        let goal = parse_integer(goal)
            .ok_or_else(|| FitnessError::validation(format!("goal '{goal}' is not an integer")))?;
        super::daily_calories(height, weight, activity, goal)
    })();
    result.map_err(|err| reject(&ctx.events, &err, CALORIE_INPUT_MESSAGE))
}

pub fn calculate_one_rep_max(ctx: &AppContext, weight: &str, reps: &str) -> Result<f64, String> {
    let result = (|| -> FitnessResult<f64> {
        let weight = required(weight, "weight")?;
        let reps = parse_integer(reps)
            .and_then(|reps| u32::try_from(reps).ok())
            .ok_or_else(|| FitnessError::validation(format!("reps '{reps}' is not a count")))?;
        super::one_rep_max(weight, reps)
    })();
    result.map_err(|err| reject(&ctx.events, &err, ONE_REP_MAX_INPUT_MESSAGE))
}
