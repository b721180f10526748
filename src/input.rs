//! Raw form input parsing and the shared failure path for commands.

use crate::{
    error::FitnessError,
    events::{EventBus, Notification},
};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const SAVE_FAILED_MESSAGE: &str = "Could not save your data. Please try again.";

/// Finite number strictly above zero.
pub fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Publishes the user-facing message for a failed command and returns it.
///
/// Input problems show `user_message`; storage problems show a generic save
/// failure so internals never reach the page.
pub fn reject(events: &EventBus, err: &FitnessError, user_message: &str) -> String {
    let message = match err {
        FitnessError::Validation(detail) => {
            log_info!("Rejected input: {detail}");
            user_message.to_string()
        }
        FitnessError::InvalidTransition { .. } => {
            log_warn!("{err}");
            user_message.to_string()
        }
        FitnessError::Persistence(source) => {
            log_error!("Storage failure: {source:#}");
            SAVE_FAILED_MESSAGE.to_string()
        }
    };
    events.notify(Notification::error(message.clone()));
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{drain, AppEvent, NotificationLevel};

    #[test]
    fn positive_parsing() {
        assert_eq!(parse_positive(" 72.5 "), Some(72.5));
        assert_eq!(parse_positive("0"), None);
        assert_eq!(parse_positive("-3"), None);
        assert_eq!(parse_positive("abc"), None);
        assert_eq!(parse_positive(""), None);
        assert_eq!(parse_positive("inf"), None);
    }

    #[test]
    fn integer_parsing_is_strict() {
        assert_eq!(parse_integer("12"), Some(12));
        assert_eq!(parse_integer("-500"), Some(-500));
        assert_eq!(parse_integer("10.5"), None);
    }

    #[test]
    fn reject_hides_storage_details() {
        let events = EventBus::new();
        let mut rx = events.subscribe();

        let err = FitnessError::Persistence(anyhow::anyhow!("SQLITE_FULL"));
        let message = reject(&events, &err, "Please enter a valid food name and calories.");
        assert_eq!(message, SAVE_FAILED_MESSAGE);

        let events = drain(&mut rx);
        assert!(matches!(
            &events[..],
            [AppEvent::Notification(n)] if n.level == NotificationLevel::Error
        ));
    }
}
