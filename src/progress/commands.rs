use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::{
    error::FitnessError,
    events::Notification,
    input::{parse_integer, reject},
    models::{FoodEntry, NewWorkout, ThemePreference, WorkoutRecord},
    progress::WEEK_DAYS,
    AppContext,
};

const FOOD_INPUT_MESSAGE: &str = "Please enter a valid food name and calories.";
const LOG_WORKOUT_MESSAGE: &str = "Could not log your workout";
const PROGRESS_MESSAGE: &str = "Could not load your progress";
const THEME_MESSAGE: &str = "Could not change the theme";

/// Counters and chart series shown on the progress card.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub workouts_this_week: usize,
    pub total_workouts: usize,
    pub weekly_series: [u32; WEEK_DAYS],
}

/// "Log workout" button: a manual entry with the configured calorie estimate.
pub async fn log_manual_workout(ctx: &AppContext) -> Result<WorkoutRecord, String> {
    let calories = i64::from(ctx.settings.tracker().manual_log_calories);
    let record = ctx
        .progress
        .log_workout(NewWorkout::manual(calories))
        .await
        .map_err(|err| reject(&ctx.events, &err, LOG_WORKOUT_MESSAGE))?;

    ctx.events.notify(Notification::success("Workout logged!"));
    Ok(record)
}

pub async fn get_progress_summary(ctx: &AppContext) -> Result<ProgressSummary, String> {
    let now = Utc::now();
    let load = async {
        let data = ctx.progress.get_progress_data().await?;
        Ok::<_, FitnessError>(ProgressSummary {
            workouts_this_week: super::weekly_count(&data.workouts, now),
            total_workouts: data.workouts.len(),
            weekly_series: super::weekly_series(&data.workouts, now),
        })
    };
    load.await
        .map_err(|err| reject(&ctx.events, &err, PROGRESS_MESSAGE))
}

/// Food modal submit, logged against today's UTC date.
pub async fn add_food(ctx: &AppContext, food: &str, calories: &str) -> Result<FoodEntry, String> {
    add_food_on(ctx, Utc::now().date_naive(), food, calories).await
}

pub async fn add_food_on(
    ctx: &AppContext,
    day: NaiveDate,
    food: &str,
    calories: &str,
) -> Result<FoodEntry, String> {
    let Some(calories) = parse_integer(calories) else {
        let err = FitnessError::validation(format!("calories '{calories}' is not a whole number"));
        return Err(reject(&ctx.events, &err, FOOD_INPUT_MESSAGE));
    };

    let entry = ctx
        .progress
        .add_food_entry(day, food, calories)
        .await
        .map_err(|err| reject(&ctx.events, &err, FOOD_INPUT_MESSAGE))?;

    ctx.events.notify(Notification::success(format!(
        "Added {} calories from {}",
        entry.calories, entry.food
    )));
    Ok(entry)
}

pub async fn get_daily_calories(ctx: &AppContext, day: NaiveDate) -> Result<u32, String> {
    ctx.progress
        .daily_calories(day)
        .await
        .map_err(|err| reject(&ctx.events, &err, PROGRESS_MESSAGE))
}

pub async fn get_theme(ctx: &AppContext) -> Result<ThemePreference, String> {
    ctx.progress
        .theme()
        .await
        .map_err(|err| reject(&ctx.events, &err, THEME_MESSAGE))
}

pub async fn toggle_theme(ctx: &AppContext) -> Result<ThemePreference, String> {
    ctx.progress
        .toggle_theme()
        .await
        .map_err(|err| reject(&ctx.events, &err, THEME_MESSAGE))
}
