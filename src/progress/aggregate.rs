//! Day bucketing for the weekly counters and chart.
//!
//! Buckets come from floor division of the millisecond distance between a
//! reference instant and each record, not from calendar weeks. A record 6 days
//! and 23 hours old is still "this week"; one exactly 7 days old is not.

use chrono::{DateTime, Utc};

use crate::models::WorkoutRecord;

pub const WEEK_DAYS: usize = 7;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Whole days between `timestamp` and `reference`, floored. Records newer than
/// the reference give negative values.
pub fn day_diff(reference: DateTime<Utc>, timestamp: DateTime<Utc>) -> i64 {
    (reference - timestamp).num_milliseconds().div_euclid(DAY_MS)
}

/// Records whose day difference is below seven.
pub fn weekly_count(workouts: &[WorkoutRecord], reference: DateTime<Utc>) -> usize {
    workouts
        .iter()
        .filter(|workout| day_diff(reference, workout.timestamp) < WEEK_DAYS as i64)
        .count()
}

/// Seven daily counts, oldest first; index 6 is the reference day.
pub fn weekly_series(workouts: &[WorkoutRecord], reference: DateTime<Utc>) -> [u32; WEEK_DAYS] {
    let mut series = [0u32; WEEK_DAYS];
    for workout in workouts {
        let diff = day_diff(reference, workout.timestamp);
        if (0..WEEK_DAYS as i64).contains(&diff) {
            series[WEEK_DAYS - 1 - diff as usize] += 1;
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutKind;
    use chrono::{Duration, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap()
    }

    fn record_at(timestamp: DateTime<Utc>) -> WorkoutRecord {
        WorkoutRecord {
            timestamp,
            duration: 20,
            calories: 100,
            kind: WorkoutKind::TimerWorkout,
        }
    }

    fn days_before(days: i64) -> WorkoutRecord {
        record_at(reference() - Duration::days(days))
    }

    #[test]
    fn counts_offsets_inside_the_window() {
        let workouts: Vec<_> = [0, 1, 6, 7, 8].into_iter().map(days_before).collect();
        assert_eq!(weekly_count(&workouts, reference()), 3);
    }

    #[test]
    fn truncates_rather_than_rounds() {
        let almost_seven = record_at(reference() - Duration::days(7) + Duration::milliseconds(1));
        let exactly_seven = days_before(7);
        assert_eq!(day_diff(reference(), almost_seven.timestamp), 6);
        assert_eq!(weekly_count(&[almost_seven, exactly_seven], reference()), 1);
    }

    #[test]
    fn series_places_today_last() {
        let workouts = vec![days_before(0), days_before(0), days_before(1), days_before(6), days_before(9)];
        assert_eq!(weekly_series(&workouts, reference()), [1, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn future_records_count_but_have_no_bucket() {
        let ahead = record_at(reference() + Duration::hours(3));
        assert_eq!(day_diff(reference(), ahead.timestamp), -1);
        assert_eq!(weekly_count(std::slice::from_ref(&ahead), reference()), 1);
        assert_eq!(weekly_series(&[ahead], reference()), [0; WEEK_DAYS]);
    }
}
