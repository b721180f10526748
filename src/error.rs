//! Error taxonomy shared by the timer, the progress store and the calculators.
//!
//! Nothing here is fatal: every variant is meant to be handled at the
//! UI-event boundary (see `commands`), either shown to the user or logged.

use thiserror::Error;

use crate::timer::TimerStatus;

#[derive(Debug, Error)]
pub enum FitnessError {
    /// Bad numeric or text input. The operation did not change any state.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("cannot {action} while the timer is {}", .status.as_str())]
    InvalidTransition {
        action: &'static str,
        status: TimerStatus,
    },

    /// Storage unavailable, full, or holding unreadable data.
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl FitnessError {
    pub fn validation(message: impl Into<String>) -> Self {
        FitnessError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FitnessError::Validation(_))
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, FitnessError::InvalidTransition { .. })
    }
}

pub type FitnessResult<T> = Result<T, FitnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_names_action_and_status() {
        let err = FitnessError::InvalidTransition {
            action: "pause",
            status: TimerStatus::Idle,
        };
        assert_eq!(err.to_string(), "cannot pause while the timer is idle");
        assert!(err.is_invalid_transition());
    }

    #[test]
    fn persistence_error_keeps_anyhow_message() {
        let err: FitnessError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
        assert!(!err.is_validation());
    }
}
