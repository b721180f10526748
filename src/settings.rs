use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

/// Knobs for the timer and the tracker. Missing fields fall back to defaults,
/// so older settings files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// How often a running timer is sampled.
    pub tick_interval_ms: u64,
    /// Ticks between two `TimerTick` events.
    pub heartbeat_every_ticks: u32,
    pub calories_per_minute: u32,
    /// Sessions shorter than this end without a workout record.
    pub min_workout_ms: u64,
    pub manual_log_calories: u32,
    /// Chat messages kept for the assistant.
    pub history_window: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            heartbeat_every_ticks: 10,
            calories_per_minute: 5,
            min_workout_ms: 60_000,
            manual_log_calories: 300,
            history_window: 10,
        }
    }
}

impl TrackerSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// `FITPULSE_DEBUG=1` emits a heartbeat on every tick.
    pub fn with_env_overrides(mut self) -> Self {
        let debug_mode = std::env::var("FITPULSE_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            self.heartbeat_every_ticks = 1;
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    tracker: TrackerSettings,
}

/// JSON settings file held in memory. `path == None` keeps everything in memory.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str(&contents) {
                Ok(data) => data,
                Err(err) => {
                    log::warn!(
                        "Ignoring unreadable settings file {}: {err}",
                        path.display()
                    );
                    UserSettings::default()
                }
            }
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    pub fn in_memory(tracker: TrackerSettings) -> Self {
        Self {
            path: None,
            data: RwLock::new(UserSettings { tracker }),
        }
    }

    pub fn tracker(&self) -> TrackerSettings {
        self.read().tracker.clone().with_env_overrides()
    }

    pub fn update_tracker(&self, settings: TrackerSettings) -> Result<()> {
        let mut guard = self.write();
        guard.tracker = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let data: UserSettings = serde_json::from_str(&contents)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let tracker = store.read().tracker.clone();
        assert_eq!(tracker, TrackerSettings::default());
    }

    #[test]
    fn update_persists_and_reload_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let custom = TrackerSettings {
            calories_per_minute: 8,
            ..TrackerSettings::default()
        };
        store.update_tracker(custom.clone()).unwrap();

        let reopened = SettingsStore::new(path).unwrap();
        reopened.reload().unwrap();
        assert_eq!(reopened.read().tracker, custom);
    }

    #[test]
    fn partial_and_broken_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("partial.json");
        fs::write(&partial, r#"{"tracker":{"min_workout_ms":30000}}"#).unwrap();
        let store = SettingsStore::new(partial).unwrap();
        let tracker = store.read().tracker.clone();
        assert_eq!(tracker.min_workout_ms, 30_000);
        assert_eq!(tracker.calories_per_minute, 5);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ nope").unwrap();
        let store = SettingsStore::new(broken).unwrap();
        assert_eq!(store.read().tracker, TrackerSettings::default());
    }
}
