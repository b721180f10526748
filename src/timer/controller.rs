use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{FitnessError, FitnessResult},
    events::{AppEvent, EventBus, Notification},
    models::{NewWorkout, WorkoutRecord},
    progress::ProgressStore,
    settings::TrackerSettings,
};

use super::{TimerState, TimerStatus};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub remaining_ms: Option<u64>,
    pub display: String,
}

fn snapshot_of(state: &TimerState, now: Instant) -> TimerSnapshot {
    let mut state = state.clone();
    state.sync_elapsed(now);
    TimerSnapshot {
        remaining_ms: state.remaining_ms(now),
        display: state.display(now),
        state,
    }
}

struct Ticker {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Ticker {
    fn cancel(self) {
        self.cancel_token.cancel();
        self.handle.abort();
    }
}

enum TickStep {
    Running { elapsed_ms: u64, display: String },
    Completed {
        elapsed_ms: u64,
        target_ms: u64,
        snapshot: TimerSnapshot,
    },
}

/// Owns the single timer. Cheap to clone; clones share the same state.
///
/// Lock order is ticker slot, then timer state. The ticker task only ever
/// takes the state lock, and it re-checks status and session under that lock
/// before acting, so once `pause`, `stop` or `reset` returns no tick from the
/// old session can change anything.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    progress: ProgressStore,
    events: EventBus,
    ticker: Arc<Mutex<Option<Ticker>>>,
    settings: TrackerSettings,
}

impl TimerController {
    pub fn new(progress: ProgressStore, events: EventBus, settings: TrackerSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::new())),
            progress,
            events,
            ticker: Arc::new(Mutex::new(None)),
            settings,
        }
    }

    pub async fn get_state(&self) -> TimerState {
        let mut guard = self.state.lock().await;
        guard.sync_elapsed(Instant::now());
        guard.clone()
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        let guard = self.state.lock().await;
        snapshot_of(&guard, Instant::now())
    }

    pub async fn start(&self) -> FitnessResult<TimerSnapshot> {
        let mut ticker_guard = self.ticker.lock().await;

        let (session_id, snapshot) = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            state.start(now)?;
            let session_id = state
                .session_id
                .clone()
                .ok_or_else(|| anyhow!("missing session id"))?;
            (session_id, snapshot_of(&state, now))
        };

        self.spawn_ticker(&mut ticker_guard, session_id);
        drop(ticker_guard);

        log_info!("Timer running at {}", snapshot.display);
        self.events
            .emit(AppEvent::TimerStateChanged(snapshot.clone()));
        Ok(snapshot)
    }

    pub async fn pause(&self) -> FitnessResult<TimerSnapshot> {
        let mut ticker_guard = self.ticker.lock().await;

        let snapshot = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            state.pause(now)?;
            snapshot_of(&state, now)
        };

        if let Some(ticker) = ticker_guard.take() {
            ticker.cancel();
        }
        drop(ticker_guard);

        log_info!("Timer paused at {}", snapshot.display);
        self.events
            .emit(AppEvent::TimerStateChanged(snapshot.clone()));
        Ok(snapshot)
    }

    /// Ends the session and, if it lasted long enough, logs one workout.
    /// Returns the logged record. An idle timer is left alone.
    pub async fn stop(&self) -> Option<WorkoutRecord> {
        let finished = {
            let mut ticker_guard = self.ticker.lock().await;
            let finished = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                state
                    .finish(now)
                    .map(|elapsed_ms| (elapsed_ms, snapshot_of(&state, now)))
            };
            if let Some(ticker) = ticker_guard.take() {
                ticker.cancel();
            }
            finished
        };

        let (elapsed_ms, snapshot) = finished?;
        log_info!("Timer stopped after {elapsed_ms} ms");
        self.events.emit(AppEvent::TimerStateChanged(snapshot));
        record_session(&self.progress, &self.events, &self.settings, elapsed_ms).await
    }

    pub async fn reset(&self) -> TimerSnapshot {
        let mut ticker_guard = self.ticker.lock().await;

        let snapshot = {
            let mut state = self.state.lock().await;
            state.reset();
            snapshot_of(&state, Instant::now())
        };

        if let Some(ticker) = ticker_guard.take() {
            ticker.cancel();
        }
        drop(ticker_guard);

        self.events
            .emit(AppEvent::TimerStateChanged(snapshot.clone()));
        snapshot
    }

    /// Quick timer: reset, arm a target of `seconds` and start counting.
    pub async fn set_target(&self, seconds: i64) -> FitnessResult<TimerSnapshot> {
        let target_ms = u64::try_from(seconds)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(|secs| secs.checked_mul(1_000))
            .ok_or_else(|| {
                FitnessError::validation(format!(
                    "quick timer needs a positive number of seconds, got {seconds}"
                ))
            })?;

        let mut ticker_guard = self.ticker.lock().await;

        let (session_id, snapshot) = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            state.arm_target(target_ms, now)?;
            let session_id = state
                .session_id
                .clone()
                .ok_or_else(|| anyhow!("missing session id"))?;
            (session_id, snapshot_of(&state, now))
        };

        if let Some(ticker) = ticker_guard.take() {
            ticker.cancel();
        }
        self.spawn_ticker(&mut ticker_guard, session_id);
        drop(ticker_guard);

        log_info!("Quick timer armed for {seconds}s");
        self.events
            .emit(AppEvent::TimerStateChanged(snapshot.clone()));
        Ok(snapshot)
    }

    /// Stops the background ticker without touching the timer state.
    pub async fn shutdown(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel();
        }
    }

    fn spawn_ticker(&self, slot: &mut Option<Ticker>, session_id: String) {
        if let Some(ticker) = slot.take() {
            ticker.cancel();
        }

        let state = self.state.clone();
        let progress = self.progress.clone();
        let events = self.events.clone();
        let settings = self.settings.clone();
        let tick_interval = settings.tick_interval();
        let heartbeat_every = settings.heartbeat_every_ticks.max(1);
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u32 = 0;

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = token.cancelled() => break,
                }

                let step = {
                    let mut guard = state.lock().await;
                    if guard.status != TimerStatus::Running
                        || guard.session_id.as_deref() != Some(session_id.as_str())
                    {
                        break;
                    }

                    let now = Instant::now();
                    let target = guard.target_ms;
                    match target {
                        Some(target_ms) if guard.target_reached(now) => {
                            let elapsed_ms = guard.finish(now).unwrap_or(target_ms).min(target_ms);
                            TickStep::Completed {
                                elapsed_ms,
                                target_ms,
                                snapshot: snapshot_of(&guard, now),
                            }
                        }
                        _ => {
                            guard.sync_elapsed(now);
                            TickStep::Running {
                                elapsed_ms: guard.elapsed_ms,
                                display: guard.display(now),
                            }
                        }
                    }
                };

                match step {
                    TickStep::Running {
                        elapsed_ms,
                        display,
                    } => {
                        ticks = ticks.wrapping_add(1);
                        if ticks % heartbeat_every == 0 {
                            events.emit(AppEvent::TimerTick {
                                elapsed_ms,
                                display,
                            });
                        }
                    }
                    TickStep::Completed {
                        elapsed_ms,
                        target_ms,
                        snapshot,
                    } => {
                        log_info!("Quick timer of {target_ms} ms completed");
                        events.emit(AppEvent::TimerStateChanged(snapshot));

                        // Saved from its own task: aborting the ticker must not cancel it.
                        let progress = progress.clone();
                        let events = events.clone();
                        let settings = settings.clone();
                        let session_id = session_id.clone();
                        tokio::spawn(async move {
                            record_session(&progress, &events, &settings, elapsed_ms).await;
                            events.emit(AppEvent::TimerCompleted {
                                session_id,
                                target_ms,
                            });
                            events.notify(Notification::success(format!(
                                "{} second timer completed!",
                                target_ms / 1_000
                            )));
                        });
                        break;
                    }
                }
            }
        });

        *slot = Some(Ticker {
            handle,
            cancel_token,
        });
    }
}

/// Turns a finished session into a workout record. Storage failures do not
/// propagate: the session is over either way, so they become a warning.
async fn record_session(
    progress: &ProgressStore,
    events: &EventBus,
    settings: &TrackerSettings,
    elapsed_ms: u64,
) -> Option<WorkoutRecord> {
    let record = WorkoutRecord::from_timer_session(
        elapsed_ms,
        settings.min_workout_ms,
        settings.calories_per_minute,
        Utc::now(),
    )?;

    match progress.log_workout(NewWorkout::from(record)).await {
        Ok(record) => {
            events.emit(AppEvent::WorkoutLogged(record.clone()));
            Some(record)
        }
        Err(err) => {
            log_warn!("Failed to save timer workout: {err:#}");
            events.notify(Notification::warning(
                "Your workout finished but could not be saved.",
            ));
            None
        }
    }
}
