pub mod assistant;
pub mod calculators;
pub mod db;
pub mod error;
pub mod events;
pub mod input;
pub mod models;
pub mod progress;
pub mod settings;
pub mod storage;
pub mod timer;
pub mod utils;

use std::{path::Path, sync::Arc};

use anyhow::Context;
use assistant::{CompletionService, Conversation};
use db::Database;
use events::EventBus;
use progress::ProgressStore;
use settings::{SettingsStore, TrackerSettings};
use storage::Storage;
use timer::TimerController;

pub use error::{FitnessError, FitnessResult};
pub use events::{AppEvent, Notification, NotificationLevel};
pub use models::{FoodEntry, ProgressData, ThemePreference, WorkoutKind, WorkoutRecord};
pub use timer::{TimerSnapshot, TimerState, TimerStatus};

/// Everything a front end needs, wired once at startup.
///
/// Clones share the same storage, timer and event bus.
#[derive(Clone)]
pub struct AppContext {
    pub storage: Storage,
    pub settings: Arc<SettingsStore>,
    pub progress: ProgressStore,
    pub timer: TimerController,
    pub events: EventBus,
}

impl AppContext {
    /// Opens (or creates) the SQLite database and settings file under `data_dir`.
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        utils::init_logging();
        log::info!("FitPulse starting up...");

        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;

        let database = Database::new(data_dir.join("fitpulse.sqlite3"))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        Ok(Self::with_storage(Storage::from(database), settings))
    }

    /// Fresh context backed by memory only. Nothing outlives it.
    pub fn in_memory(tracker: TrackerSettings) -> Self {
        Self::with_storage(Storage::memory(), SettingsStore::in_memory(tracker))
    }

    pub fn with_storage(storage: Storage, settings: SettingsStore) -> Self {
        let events = EventBus::new();
        let progress = ProgressStore::new(storage.clone());
        let timer = TimerController::new(progress.clone(), events.clone(), settings.tracker());

        Self {
            storage,
            settings: Arc::new(settings),
            progress,
            timer,
            events,
        }
    }

    /// Assistant chat keeping the configured number of recent messages.
    pub fn conversation<S: CompletionService>(&self, service: S) -> Conversation<S> {
        Conversation::new(service, self.settings.tracker().history_window)
    }

    pub async fn shutdown(&self) {
        self.timer.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_persists_between_contexts() {
        let dir = tempfile::tempdir().unwrap();

        let ctx = AppContext::open(dir.path()).unwrap();
        assert!(matches!(ctx.storage, Storage::Sqlite(_)));
        progress::commands::log_manual_workout(&ctx).await.unwrap();
        progress::commands::toggle_theme(&ctx).await.unwrap();
        ctx.shutdown().await;
        drop(ctx);

        let reopened = AppContext::open(dir.path()).unwrap();
        let data = reopened.progress.get_progress_data().await.unwrap();
        assert_eq!(data.workouts.len(), 1);
        assert_eq!(
            reopened.progress.theme().await.unwrap(),
            ThemePreference::Light
        );
    }
}
