use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FitnessError, FitnessResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    TimerWorkout,
    ManualLog,
}

impl WorkoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::TimerWorkout => "timer_workout",
            WorkoutKind::ManualLog => "manual_log",
        }
    }
}

/// One completed workout as persisted under the `progress` key.
///
/// The timestamp is only used for day bucketing; two records may share it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutRecord {
    pub timestamp: DateTime<Utc>,
    /// Whole minutes. Manual logs written by older front-ends omit it.
    #[serde(default)]
    pub duration: u32,
    pub calories: u32,
    #[serde(rename = "type")]
    pub kind: WorkoutKind,
}

impl WorkoutRecord {
    /// Record for a finished timer session, or `None` when the session was
    /// shorter than `min_workout_ms`.
    pub fn from_timer_session(
        elapsed_ms: u64,
        min_workout_ms: u64,
        calories_per_minute: u32,
        timestamp: DateTime<Utc>,
    ) -> Option<Self> {
        if elapsed_ms < min_workout_ms {
            return None;
        }
        let duration = u32::try_from(elapsed_ms / 60_000).unwrap_or(u32::MAX);
        Some(Self {
            timestamp,
            duration,
            calories: duration.saturating_mul(calories_per_minute),
            kind: WorkoutKind::TimerWorkout,
        })
    }
}

/// Unvalidated workout as handed to `ProgressStore::log_workout`.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub duration: i64,
    pub calories: i64,
    pub kind: WorkoutKind,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewWorkout {
    pub fn manual(calories: i64) -> Self {
        Self {
            duration: 0,
            calories,
            kind: WorkoutKind::ManualLog,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn into_record(self, now: DateTime<Utc>) -> FitnessResult<WorkoutRecord> {
        let duration = u32::try_from(self.duration).map_err(|_| {
            FitnessError::validation(format!("workout duration {} is out of range", self.duration))
        })?;
        let calories = u32::try_from(self.calories).map_err(|_| {
            FitnessError::validation(format!("workout calories {} is out of range", self.calories))
        })?;
        Ok(WorkoutRecord {
            timestamp: self.timestamp.unwrap_or(now),
            duration,
            calories,
            kind: self.kind,
        })
    }
}

impl From<WorkoutRecord> for NewWorkout {
    fn from(record: WorkoutRecord) -> Self {
        Self {
            duration: i64::from(record.duration),
            calories: i64::from(record.calories),
            kind: record.kind,
            timestamp: Some(record.timestamp),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressData {
    #[serde(default)]
    pub workouts: Vec<WorkoutRecord>,
}
