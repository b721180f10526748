pub mod aggregate;
pub mod commands;
pub mod store;

pub use aggregate::{day_diff, weekly_count, weekly_series, WEEK_DAYS};
pub use store::ProgressStore;
