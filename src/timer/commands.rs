use crate::{
    error::FitnessError,
    input::{parse_integer, reject},
    models::WorkoutRecord,
    timer::{TimerController, TimerSnapshot},
    AppContext,
};

const QUICK_TIMER_INPUT_MESSAGE: &str = "Please choose a timer length in seconds";

const ENABLE_LOGS: bool = true;

use crate::log_info;

fn controller_from_state(ctx: &AppContext) -> TimerController {
    ctx.timer.clone()
}

pub async fn get_timer_state(ctx: &AppContext) -> TimerSnapshot {
    controller_from_state(ctx).get_snapshot().await
}

/// Start or resume. Pressing start on a running timer changes nothing.
pub async fn start_timer(ctx: &AppContext) -> Result<TimerSnapshot, String> {
    let controller = controller_from_state(ctx);
    match controller.start().await {
        Ok(snapshot) => Ok(snapshot),
        Err(err) if err.is_invalid_transition() => {
            log_info!("Ignoring start: {err}");
            Ok(controller.get_snapshot().await)
        }
        Err(err) => Err(reject(&ctx.events, &err, "Could not start the timer")),
    }
}

/// Pause. Pausing a timer that is not running changes nothing.
pub async fn pause_timer(ctx: &AppContext) -> Result<TimerSnapshot, String> {
    let controller = controller_from_state(ctx);
    match controller.pause().await {
        Ok(snapshot) => Ok(snapshot),
        Err(err) if err.is_invalid_transition() => {
            log_info!("Ignoring pause: {err}");
            Ok(controller.get_snapshot().await)
        }
        Err(err) => Err(reject(&ctx.events, &err, "Could not pause the timer")),
    }
}

pub async fn stop_timer(ctx: &AppContext) -> Option<WorkoutRecord> {
    controller_from_state(ctx).stop().await
}

pub async fn reset_timer(ctx: &AppContext) -> TimerSnapshot {
    controller_from_state(ctx).reset().await
}

/// Quick timer button; `seconds` is the button's raw `data-seconds` value.
pub async fn start_quick_timer(ctx: &AppContext, seconds: &str) -> Result<TimerSnapshot, String> {
    let Some(seconds) = parse_integer(seconds) else {
        let err = FitnessError::validation(format!("quick timer length '{seconds}' is not a number"));
        return Err(reject(&ctx.events, &err, QUICK_TIMER_INPUT_MESSAGE));
    };

    controller_from_state(ctx)
        .set_target(seconds)
        .await
        .map_err(|err| reject(&ctx.events, &err, QUICK_TIMER_INPUT_MESSAGE))
}
