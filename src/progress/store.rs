use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::{
    error::FitnessResult,
    models::{day_key, FoodEntry, NewWorkout, NutritionLog, ProgressData, ThemePreference, WorkoutRecord},
    storage::{Storage, NUTRITION_KEY, PROGRESS_KEY, THEME_KEY},
};

use super::aggregate::{self, WEEK_DAYS};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Workout log, nutrition log and theme preference on top of a key-value
/// backend. Each write rewrites the whole document for its key.
#[derive(Clone)]
pub struct ProgressStore {
    storage: Storage,
    write_lock: Arc<Mutex<()>>,
}

impl ProgressStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Owned copy of the full log; callers can mutate it freely.
    pub async fn get_progress_data(&self) -> FitnessResult<ProgressData> {
        self.read_document(PROGRESS_KEY).await
    }

    pub async fn log_workout(&self, workout: NewWorkout) -> FitnessResult<WorkoutRecord> {
        let record = workout.into_record(Utc::now())?;

        let _guard = self.write_lock.lock().await;
        let mut progress: ProgressData = self.read_document(PROGRESS_KEY).await?;
        progress.workouts.push(record.clone());
        self.write_document(PROGRESS_KEY, &progress).await?;

        log_info!(
            "Logged {} workout: {} min, {} kcal",
            record.kind.as_str(),
            record.duration,
            record.calories
        );
        Ok(record)
    }

    pub async fn weekly_count(&self, reference: DateTime<Utc>) -> FitnessResult<usize> {
        let progress = self.get_progress_data().await?;
        Ok(aggregate::weekly_count(&progress.workouts, reference))
    }

    pub async fn weekly_series(&self, reference: DateTime<Utc>) -> FitnessResult<[u32; WEEK_DAYS]> {
        let progress = self.get_progress_data().await?;
        Ok(aggregate::weekly_series(&progress.workouts, reference))
    }

    pub async fn total_count(&self) -> FitnessResult<usize> {
        Ok(self.get_progress_data().await?.workouts.len())
    }

    pub async fn add_food_entry(
        &self,
        day: NaiveDate,
        food: &str,
        calories: i64,
    ) -> FitnessResult<FoodEntry> {
        let entry = FoodEntry::new(food, calories)?;

        let _guard = self.write_lock.lock().await;
        let mut nutrition: NutritionLog = self.read_document(NUTRITION_KEY).await?;
        nutrition.entry(day_key(day)).or_default().push(entry.clone());
        self.write_document(NUTRITION_KEY, &nutrition).await?;

        log_info!("Added {} kcal of {} on {}", entry.calories, entry.food, day);
        Ok(entry)
    }

    pub async fn nutrition_log(&self) -> FitnessResult<NutritionLog> {
        self.read_document(NUTRITION_KEY).await
    }

    pub async fn nutrition_for(&self, day: NaiveDate) -> FitnessResult<Vec<FoodEntry>> {
        let mut nutrition = self.nutrition_log().await?;
        Ok(nutrition.remove(&day_key(day)).unwrap_or_default())
    }

    pub async fn daily_calories(&self, day: NaiveDate) -> FitnessResult<u32> {
        let entries = self.nutrition_for(day).await?;
        Ok(entries
            .iter()
            .fold(0u32, |total, entry| total.saturating_add(entry.calories)))
    }

    /// Stored theme, `dark` when nothing usable is stored.
    pub async fn theme(&self) -> FitnessResult<ThemePreference> {
        let stored = self.storage.get(THEME_KEY).await?;
        Ok(match stored {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log_warn!("Ignoring unknown stored theme '{raw}'");
                ThemePreference::default()
            }),
            None => ThemePreference::default(),
        })
    }

    pub async fn set_theme(&self, theme: ThemePreference) -> FitnessResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_theme(theme).await
    }

    pub async fn toggle_theme(&self) -> FitnessResult<ThemePreference> {
        let _guard = self.write_lock.lock().await;
        let next = self.theme().await?.toggled();
        self.write_theme(next).await?;
        log_info!("Theme toggled to {}", next.as_str());
        Ok(next)
    }

    /// Caller holds `write_lock`.
    async fn write_theme(&self, theme: ThemePreference) -> FitnessResult<()> {
        self.storage
            .set(THEME_KEY, theme.as_str().to_string())
            .await?;
        Ok(())
    }

    async fn read_document<T>(&self, key: &str) -> FitnessResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.storage.get(key).await? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("stored '{key}' data is not valid"))?;
                Ok(value)
            }
            None => Ok(T::default()),
        }
    }

    async fn write_document<T: Serialize>(&self, key: &str, value: &T) -> FitnessResult<()> {
        let serialized =
            serde_json::to_string(value).with_context(|| format!("failed to serialize '{key}'"))?;
        self.storage.set(key, serialized).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::WorkoutKind, storage::MemoryStore};
    use chrono::{Duration, TimeZone};

    fn store() -> (ProgressStore, MemoryStore) {
        let memory = MemoryStore::default();
        (ProgressStore::new(Storage::Memory(memory.clone())), memory)
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn empty_store_reports_zero() {
        let (store, _) = store();
        assert!(store.get_progress_data().await.unwrap().workouts.is_empty());
        assert_eq!(store.total_count().await.unwrap(), 0);
        assert_eq!(store.weekly_count(reference()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn weekly_and_total_counts_follow_the_log() {
        let (store, _) = store();
        for offset in [0, 1, 6, 7, 8] {
            store
                .log_workout(NewWorkout::manual(300).at(reference() - Duration::days(offset)))
                .await
                .unwrap();
        }

        assert_eq!(store.weekly_count(reference()).await.unwrap(), 3);
        assert_eq!(store.total_count().await.unwrap(), 5);
        assert_eq!(
            store.weekly_series(reference()).await.unwrap(),
            [1, 0, 0, 0, 0, 1, 1]
        );
    }

    #[tokio::test]
    async fn log_keeps_insertion_order_and_returned_copy_is_detached() {
        let (store, _) = store();
        let first = store
            .log_workout(NewWorkout::manual(300).at(reference()))
            .await
            .unwrap();
        store
            .log_workout(NewWorkout::manual(100).at(reference() - Duration::days(3)))
            .await
            .unwrap();

        let mut data = store.get_progress_data().await.unwrap();
        assert_eq!(data.workouts[0], first);
        assert_eq!(data.workouts[1].calories, 100);

        data.workouts.clear();
        assert_eq!(store.total_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn negative_workout_is_rejected_without_write() {
        let (store, memory) = store();
        let err = store.log_workout(NewWorkout::manual(-1)).await.unwrap_err();
        assert!(err.is_validation());
        assert!(memory.get(PROGRESS_KEY).is_none());
    }

    #[tokio::test]
    async fn persisted_layout_matches_browser_format() {
        let (store, memory) = store();
        store
            .log_workout(NewWorkout {
                duration: 12,
                calories: 60,
                kind: WorkoutKind::TimerWorkout,
                timestamp: Some(reference()),
            })
            .await
            .unwrap();

        let raw = memory.get(PROGRESS_KEY).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let workout = &json["workouts"][0];
        assert_eq!(workout["duration"], 12);
        assert_eq!(workout["calories"], 60);
        assert_eq!(workout["type"], "timer_workout");
        assert!(workout["timestamp"].is_string());
    }

    #[tokio::test]
    async fn food_entries_group_by_day() {
        let (store, memory) = store();
        store.add_food_entry(day(), "oats", 150).await.unwrap();
        store.add_food_entry(day(), "banana", 105).await.unwrap();
        let next_day = day().succ_opt().unwrap();
        store.add_food_entry(next_day, "rice", 200).await.unwrap();

        let entries = store.nutrition_for(day()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].food, "banana");
        assert_eq!(store.daily_calories(day()).await.unwrap(), 255);
        assert_eq!(store.daily_calories(next_day).await.unwrap(), 200);

        let raw = memory.get(NUTRITION_KEY).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["2024-06-01"][0]["food"], "oats");
    }

    #[tokio::test]
    async fn invalid_food_entry_leaves_log_untouched() {
        let (store, _) = store();
        store.add_food_entry(day(), "oats", 150).await.unwrap();
        let before = store.nutrition_log().await.unwrap();

        assert!(store.add_food_entry(day(), "apple", 0).await.is_err());
        assert!(store.add_food_entry(day(), "  ", 80).await.is_err());
        assert_eq!(store.nutrition_log().await.unwrap(), before);
    }

    #[tokio::test]
    async fn corrupt_document_surfaces_persistence_error() {
        let (store, memory) = store();
        memory.set(PROGRESS_KEY, "not json".into()).unwrap();
        let err = store.total_count().await.unwrap_err();
        assert!(matches!(err, crate::error::FitnessError::Persistence(_)));
    }

    #[tokio::test]
    async fn theme_defaults_to_dark_and_toggles() {
        let (store, memory) = store();
        assert_eq!(store.theme().await.unwrap(), ThemePreference::Dark);
        assert_eq!(store.toggle_theme().await.unwrap(), ThemePreference::Light);
        assert_eq!(memory.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(store.toggle_theme().await.unwrap(), ThemePreference::Dark);

        memory.set(THEME_KEY, "sepia".into()).unwrap();
        assert_eq!(store.theme().await.unwrap(), ThemePreference::Dark);
    }

    #[tokio::test]
    async fn sqlite_backend_behaves_like_memory() {
        let db = crate::db::Database::in_memory().unwrap();
        let store = ProgressStore::new(Storage::from(db));
        store.log_workout(NewWorkout::manual(300)).await.unwrap();
        store.add_food_entry(day(), "eggs", 140).await.unwrap();

        assert_eq!(store.total_count().await.unwrap(), 1);
        assert_eq!(store.daily_calories(day()).await.unwrap(), 140);
    }

    #[tokio::test]
    async fn concurrent_toggles_both_apply() {
        let db = crate::db::Database::in_memory().unwrap();
        let store = ProgressStore::new(Storage::from(db));

        let (first, second) = tokio::join!(store.toggle_theme(), store.toggle_theme());
        let mut results = vec![first.unwrap(), second.unwrap()];
        results.sort_by_key(|theme| theme.as_str());
        assert_eq!(results, vec![ThemePreference::Dark, ThemePreference::Light]);
        assert_eq!(store.theme().await.unwrap(), ThemePreference::Dark);
    }
}
