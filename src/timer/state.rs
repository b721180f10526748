use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::{FitnessError, FitnessResult};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        }
    }
}

/// Stopwatch state. Every transition takes the current instant explicitly so
/// the controller and the tests decide what "now" is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub session_id: Option<String>,
    pub elapsed_ms: u64,
    /// Quick timer ceiling. `None` means a manual stopwatch.
    pub target_ms: Option<u64>,
    pub started_at: Option<DateTime<Utc>>,
    /// Time accumulated from earlier running windows; combines with `running_anchor`
    /// to compute the true elapsed duration.
    #[serde(skip)]
    pub elapsed_baseline_ms: u64,
    #[serde(skip)]
    pub running_anchor: Option<Instant>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            status: TimerStatus::Idle,
            session_id: None,
            elapsed_ms: 0,
            target_ms: None,
            started_at: None,
            elapsed_baseline_ms: 0,
            running_anchor: None,
        }
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn current_elapsed_ms(&self, now: Instant) -> u64 {
        if let (TimerStatus::Running, Some(anchor)) = (self.status, self.running_anchor) {
            self.elapsed_baseline_ms
                .saturating_add(now.saturating_duration_since(anchor).as_millis() as u64)
        } else {
            self.elapsed_ms
        }
    }

    pub fn sync_elapsed(&mut self, now: Instant) {
        self.elapsed_ms = self.current_elapsed_ms(now);
    }

    /// Idle -> Running opens a new session; Paused -> Running resumes it.
    pub fn start(&mut self, now: Instant) -> FitnessResult<()> {
        match self.status {
            TimerStatus::Running => Err(FitnessError::InvalidTransition {
                action: "start",
                status: self.status,
            }),
            TimerStatus::Idle => {
                self.begin_session(now);
                Ok(())
            }
            TimerStatus::Paused => {
                self.resume(now);
                Ok(())
            }
        }
    }

    pub fn pause(&mut self, now: Instant) -> FitnessResult<()> {
        if self.status != TimerStatus::Running {
            return Err(FitnessError::InvalidTransition {
                action: "pause",
                status: self.status,
            });
        }
        self.sync_elapsed(now);
        self.status = TimerStatus::Paused;
        self.running_anchor = None;
        self.elapsed_baseline_ms = self.elapsed_ms;
        Ok(())
    }

    /// Ends the session and returns the frozen elapsed time, leaving the
    /// state idle. An idle timer has no session to end and yields `None`.
    pub fn finish(&mut self, now: Instant) -> Option<u64> {
        if self.status == TimerStatus::Idle {
            return None;
        }
        self.sync_elapsed(now);
        let elapsed = self.elapsed_ms;
        self.reset();
        Some(elapsed)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Resets, arms a target and starts a fresh session.
    pub fn arm_target(&mut self, target_ms: u64, now: Instant) -> FitnessResult<()> {
        if target_ms == 0 {
            return Err(FitnessError::validation("timer target must be positive"));
        }
        self.reset();
        self.target_ms = Some(target_ms);
        self.begin_session(now);
        Ok(())
    }

    pub fn target_reached(&self, now: Instant) -> bool {
        match self.target_ms {
            Some(target) => self.is_running() && self.current_elapsed_ms(now) >= target,
            None => false,
        }
    }

    pub fn remaining_ms(&self, now: Instant) -> Option<u64> {
        self.target_ms
            .map(|target| target.saturating_sub(self.current_elapsed_ms(now)))
    }

    pub fn display(&self, now: Instant) -> String {
        format_elapsed(self.current_elapsed_ms(now))
    }

    fn begin_session(&mut self, now: Instant) {
        self.session_id = Some(Uuid::new_v4().to_string());
        self.started_at = Some(Utc::now());
        self.elapsed_ms = 0;
        self.resume(now);
    }

    fn resume(&mut self, now: Instant) {
        self.status = TimerStatus::Running;
        self.elapsed_baseline_ms = self.elapsed_ms;
        self.running_anchor = Some(now);
    }
}

/// `MM:SS`, minutes uncapped.
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let minutes = elapsed_ms / 60_000;
    let seconds = (elapsed_ms % 60_000) / 1_000;
    format!("{minutes:02}:{seconds:02}")
}
